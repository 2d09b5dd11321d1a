/*
 *  lcd/drivers/mod.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character LCD drivers
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

// HD44780 plate, generic over any embedded-hal I2C bus
pub mod charlcd_plate;

// Console emulator for desktop testing
pub mod console;

// Mock driver for testing
pub mod mock;
