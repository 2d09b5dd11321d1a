/*
 *  lcd/factory.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured LCD driver
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

use log::info;

use crate::config::{DisplayConfig, DriverKind};
use crate::lcd::drivers::console::ConsoleLcd;
use crate::lcd::error::DisplayError;
use crate::lcd::traits::BoxedLcd;

#[cfg(feature = "driver-plate")]
use crate::lcd::drivers::charlcd_plate::{CharLcdPlate, MCP23017_ADDRESS};

pub const DEFAULT_COLUMNS: usize = 16;
pub const DEFAULT_ROWS: usize = 2;
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Factory for creating LCD drivers from configuration
pub struct LcdFactory;

impl LcdFactory {
    /// Create the driver named in `config`.
    ///
    /// `emulated` forces the console driver whatever `driver` says; with no
    /// driver set the plate on the default bus is assumed.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedLcd, DisplayError> {
        Self::create_with_console(config, |columns, rows| Box::new(ConsoleLcd::stdio(columns, rows)))
    }

    /// As `create_from_config`, with `console` building the emulator
    pub fn create_with_console<F>(config: &DisplayConfig, console: F) -> Result<BoxedLcd, DisplayError>
    where
        F: FnOnce(usize, usize) -> BoxedLcd,
    {
        let columns = config.columns.unwrap_or(DEFAULT_COLUMNS);
        let rows = config.rows.unwrap_or(DEFAULT_ROWS);

        if config.emulated.unwrap_or(false) {
            info!("Emulation mode enabled - creating console driver");
            return Ok(console(columns, rows));
        }

        match config.driver.unwrap_or(DriverKind::Plate) {
            DriverKind::Console => Ok(console(columns, rows)),

            #[cfg(feature = "driver-plate")]
            DriverKind::Plate => {
                let bus = config.bus.as_deref().unwrap_or(DEFAULT_I2C_BUS);
                let address = config.address.unwrap_or(MCP23017_ADDRESS);
                Ok(Box::new(CharLcdPlate::open(bus, address, columns, rows)?))
            }

            #[cfg(not(feature = "driver-plate"))]
            DriverKind::Plate => Err(DisplayError::UnsupportedDriver("plate".to_string())),
        }
    }
}
