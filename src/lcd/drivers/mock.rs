/*
 *  lcd/drivers/mock.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock LCD and button source for testing without hardware
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use crate::lcd::error::DisplayError;
use crate::lcd::traits::{Button, CharDisplay, InputSource, ScrollDirection};

/// A single recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Clear,
    Write(String),
    Scroll(ScrollDirection),
}

/// Mock LCD driver for testing
///
/// Records every operation in a shared state so tests can inspect what the
/// refresh task did after handing the driver off to it.
#[derive(Debug, Clone)]
pub struct MockLcd {
    columns: usize,

    /// Shared state for testing
    state: Arc<Mutex<MockLcdState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockLcdState {
    /// Every call in order
    pub calls: Vec<MockCall>,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Current window offset, negative is left of origin
    pub offset: i32,

    /// Buttons currently held down
    pub held: HashSet<Button>,

    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
}

impl MockLcdState {
    /// Messages written, in order
    pub fn messages(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MockCall::Write(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Scroll steps taken, in order
    pub fn scrolls(&self) -> Vec<ScrollDirection> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                MockCall::Scroll(direction) => Some(*direction),
                _ => None,
            })
            .collect()
    }
}

impl MockLcd {
    /// Create a mock with the given number of columns
    pub fn new(columns: usize) -> Self {
        Self {
            columns,
            state: Arc::new(Mutex::new(MockLcdState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockLcdState>> {
        Arc::clone(&self.state)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockLcdState) -> R) -> Result<R, DisplayError> {
        let mut state = self.state
            .lock()
            .map_err(|_| DisplayError::Other("mock state poisoned".to_string()))?;
        Ok(f(&mut state))
    }
}

impl CharDisplay for MockLcd {
    fn columns(&self) -> usize {
        self.columns
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.with_state(|state| {
            state.clear_count += 1;
            state.offset = 0;
            state.calls.push(MockCall::Clear);
        })
    }

    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        self.with_state(|state| {
            if state.simulate_write_failure {
                return Err(DisplayError::Other("Simulated write failure".to_string()));
            }
            state.calls.push(MockCall::Write(text.to_string()));
            Ok(())
        })?
    }

    fn scroll_step(&mut self, direction: ScrollDirection) -> Result<(), DisplayError> {
        self.with_state(|state| {
            state.offset += match direction {
                ScrollDirection::Left => -1,
                ScrollDirection::Right => 1,
            };
            state.calls.push(MockCall::Scroll(direction));
        })
    }
}

impl InputSource for MockLcd {
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError> {
        self.with_state(|state| state.held.contains(&button))
    }
}

/// Queued button presses; each queued press is reported exactly once
#[derive(Debug, Clone, Default)]
pub struct MockButtons {
    pending: Arc<Mutex<VecDeque<Button>>>,
    polls: Arc<Mutex<usize>>,
}

impl MockButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a press, delivered the next time `button` is polled at the head of the queue
    pub fn press(&self, button: Button) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(button);
        }
    }

    /// Presses not yet delivered
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Number of is_pressed calls seen
    pub fn polls(&self) -> usize {
        self.polls.lock().map(|p| *p).unwrap_or(0)
    }
}

impl InputSource for MockButtons {
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError> {
        if let Ok(mut polls) = self.polls.lock() {
            *polls += 1;
        }
        let mut pending = self.pending
            .lock()
            .map_err(|_| DisplayError::Other("mock buttons poisoned".to_string()))?;
        if pending.front() == Some(&button) {
            pending.pop_front();
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
