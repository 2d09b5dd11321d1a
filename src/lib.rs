/*
 *  lib.rs
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

pub mod cancel;
pub mod config;
pub mod countdown;
pub mod events;
pub mod lcd;
pub mod refresh;
pub mod scroll;
pub mod shutdown;
pub mod switcher;

pub use cancel::CancelSignal;
pub use events::{CatalogError, Event, EventCatalog};
pub use refresh::{RefreshTask, TaskState, Timing};
pub use switcher::{EventSwitcher, SwitchRequest};
