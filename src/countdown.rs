/*
 *  countdown.rs
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

use chrono::NaiveDateTime;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Rendered countdown for one event at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    /// Full two line message, "{name} in\n{line}"
    pub text: String,
    /// Second row only, e.g. "3 days 4 hours"
    pub line: String,
    pub days: i64,
    pub hours: i64,
    /// Either row is wider than the display
    pub overflowing: bool,
    scroll_length: usize,
}

impl Countdown {
    /// Widest row in characters; what the scroll plan has to reveal
    pub fn scroll_length(&self) -> usize {
        self.scroll_length
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Whole days and whole hours left, floored like a calendar.
///
/// Past targets are not clamped: days go negative while the hour remainder
/// stays in 0..24, so an event 1h ago reads "-1 days 23 hours".
pub fn remaining(now: NaiveDateTime, target: NaiveDateTime) -> (i64, i64) {
    let delta = target - now;
    let seconds = delta.num_milliseconds().div_euclid(1_000);
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let hours = seconds.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    (days, hours)
}

/// Format the countdown message for `name` on a display `columns` wide
pub fn format(now: NaiveDateTime, target: NaiveDateTime, name: &str, columns: usize) -> Countdown {
    let (days, hours) = remaining(now, target);
    let line = format!("{} {}", plural(days, "day"), plural(hours, "hour"));
    let text = format!("{name} in\n{line}");
    let scroll_length = name.chars().count().max(line.chars().count());

    Countdown {
        text,
        line,
        days,
        hours,
        overflowing: columns < scroll_length,
        scroll_length,
    }
}
