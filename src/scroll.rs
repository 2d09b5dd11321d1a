/*
 *  scroll.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::time::Duration;

use crate::lcd::ScrollDirection;

pub const PRE_PAUSE_MILLIS: u64 = 500;
pub const POST_PAUSE_MILLIS: u64 = 1000;

/// One column shift plus the pauses either side of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStep {
    pub direction: ScrollDirection,
    pub pre_pause: Duration,
    pub post_pause: Duration,
}

/// Cylon style sweep: left until the far edge is visible, then back home.
///
/// Lazily yields `2 * (length - width)` steps, nothing when the message fits.
#[derive(Debug, Clone)]
pub struct ScrollPlan {
    overhang: usize,
    taken: usize,
    pre_pause: Duration,
    post_pause: Duration,
}

impl ScrollPlan {
    /// Total steps in the sweep
    pub fn total(&self) -> usize {
        self.overhang * 2
    }
}

impl Iterator for ScrollPlan {
    type Item = ScrollStep;

    fn next(&mut self) -> Option<ScrollStep> {
        if self.taken >= self.total() {
            return None;
        }
        let direction = if self.taken < self.overhang {
            ScrollDirection::Left
        } else {
            ScrollDirection::Right
        };
        self.taken += 1;
        Some(ScrollStep {
            direction,
            pre_pause: self.pre_pause,
            post_pause: self.post_pause,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total() - self.taken;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScrollPlan {}

/// Plan with the stock half second / one second cadence
pub fn plan(width: usize, length: usize) -> ScrollPlan {
    plan_with_pauses(
        width,
        length,
        Duration::from_millis(PRE_PAUSE_MILLIS),
        Duration::from_millis(POST_PAUSE_MILLIS),
    )
}

pub fn plan_with_pauses(width: usize, length: usize, pre_pause: Duration, post_pause: Duration) -> ScrollPlan {
    ScrollPlan {
        overhang: length.saturating_sub(width),
        taken: 0,
        pre_pause,
        post_pause,
    }
}
