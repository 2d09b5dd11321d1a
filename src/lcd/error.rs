/*
 *  lcd/error.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for character LCD operations
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

use std::fmt;
use std::error::Error;

/// Unified error type for all LCD and button operations
#[derive(Debug)]
pub enum DisplayError {
    /// Hardware initialization failed
    InitializationFailed(String),

    /// I2C communication error
    I2cError(String),

    /// Console emulator write failed
    Io(std::io::Error),

    /// Invalid configuration
    InvalidConfiguration(String),

    /// Driver not compiled into this build
    UnsupportedDriver(String),

    /// The refresh task panicked or was aborted before reporting back
    TaskFailed(String),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::InitializationFailed(msg) =>
                write!(f, "Display initialization failed: {}", msg),
            DisplayError::I2cError(msg) =>
                write!(f, "I2C communication error: {}", msg),
            DisplayError::Io(err) =>
                write!(f, "Console I/O error: {}", err),
            DisplayError::InvalidConfiguration(msg) =>
                write!(f, "Invalid configuration: {}", msg),
            DisplayError::UnsupportedDriver(name) =>
                write!(f, "Driver '{}' is not available in this build", name),
            DisplayError::TaskFailed(msg) =>
                write!(f, "Refresh task failed: {}", msg),
            DisplayError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for DisplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DisplayError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Io(err)
    }
}

impl From<tokio::task::JoinError> for DisplayError {
    fn from(err: tokio::task::JoinError) -> Self {
        DisplayError::TaskFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DisplayError::I2cError("nack".to_string());
        assert_eq!(err.to_string(), "I2C communication error: nack");

        let err = DisplayError::UnsupportedDriver("plate".to_string());
        assert_eq!(err.to_string(), "Driver 'plate' is not available in this build");
    }

    #[test]
    fn test_io_source() {
        let err: DisplayError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("gone"));
    }
}
