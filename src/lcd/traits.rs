/*
 *  lcd/traits.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capability traits implemented by every character LCD driver
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

use std::sync::Arc;
use tokio::sync::Mutex as TokMutex;

use crate::lcd::error::DisplayError;

/// Direction the whole display window shifts for one scroll step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

/// Buttons found on a character LCD plate.
/// Only `Up` and `Down` drive event switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Select,
    Right,
    Down,
    Up,
    Left,
}

/// Minimal character display abstraction
///
/// Every driver renders a newline separated message starting at the home
/// position and can shift the visible window one column at a time, which is
/// how messages wider than the panel are revealed.
pub trait CharDisplay: Send {
    /// Number of visible columns
    fn columns(&self) -> usize;

    /// Blank the display and return the window to its origin
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write a message; `\n` moves to the start of the next row
    fn write_message(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Shift the visible window by one column
    fn scroll_step(&mut self, direction: ScrollDirection) -> Result<(), DisplayError>;
}

/// Level polled button source; a held button reads true on every poll
pub trait InputSource: Send {
    /// Returns true while `button` is held (or, for queued sources, once per press)
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError>;
}

/// A device that is both display and button source, e.g. an LCD plate
pub trait CharLcd: CharDisplay + InputSource {}

impl<T: CharDisplay + InputSource> CharLcd for T {}

/// Type alias for boxed LCD trait objects
pub type BoxedLcd = Box<dyn CharLcd>;

/// Handle shared between the refresh task (writes) and the switcher (button reads)
pub type SharedLcd<D> = Arc<TokMutex<D>>;

impl<T: CharDisplay + ?Sized> CharDisplay for Box<T> {
    fn columns(&self) -> usize {
        (**self).columns()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write_message(text)
    }

    fn scroll_step(&mut self, direction: ScrollDirection) -> Result<(), DisplayError> {
        (**self).scroll_step(direction)
    }
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError> {
        (**self).is_pressed(button)
    }
}
