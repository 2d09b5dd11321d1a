/*
 *  events.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  The fixed, ordered list of events to count down to
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

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use thiserror::Error;

use crate::config::EventConfig;

/// Event dates are month/day/year unless the config says otherwise
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no events configured, at least one event is required")]
    Empty,
    #[error("event '{name}': date '{date}' does not match format '{format}': {source}")]
    InvalidDate {
        name: String,
        date: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A named moment to count down to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub target: NaiveDateTime,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NaiveDateTime) -> Self {
        Self { name: name.into(), target }
    }

    /// Parse `date` with `format`. Date-only formats land on local midnight.
    pub fn parse(name: &str, date: &str, format: &str) -> Result<Self, CatalogError> {
        let target = match NaiveDateTime::parse_from_str(date, format) {
            Ok(dt) => dt,
            Err(_) => NaiveDate::parse_from_str(date, format)
                .map(|d| d.and_time(NaiveTime::MIN))
                .map_err(|source| CatalogError::InvalidDate {
                    name: name.to_string(),
                    date: date.to_string(),
                    format: format.to_string(),
                    source,
                })?,
        };
        Ok(Self::new(name, target))
    }
}

/// Ordered, non-empty list of events; all indexing wraps.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    pub fn new(events: Vec<Event>) -> Result<Self, CatalogError> {
        if events.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { events })
    }

    /// Build from config entries; any bad date aborts the whole catalog
    pub fn from_config(entries: &[EventConfig], format: &str) -> Result<Self, CatalogError> {
        let events = entries
            .iter()
            .map(|e| Event::parse(&e.name, &e.date, format))
            .collect::<Result<Vec<_>, _>>()?;
        for event in &events {
            debug!("event '{}' at {}", event.name, event.target);
        }
        Self::new(events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> &Event {
        &self.events[index % self.events.len()]
    }

    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.events.len()
    }

    /// Floored modulo, so 0 wraps to the last event
    pub fn previous(&self, index: usize) -> usize {
        let len = self.events.len();
        (index % len + len - 1) % len
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}
