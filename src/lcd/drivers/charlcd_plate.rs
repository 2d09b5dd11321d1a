/*
 *  lcd/drivers/charlcd_plate.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 character LCD plate behind an MCP23017 I2C port expander
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

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::lcd::error::DisplayError;
use crate::lcd::traits::{Button, CharDisplay, InputSource, ScrollDirection};

/// Default address of the plate's MCP23017
pub const MCP23017_ADDRESS: u8 = 0x20;

// MCP23017 registers, IOCON.BANK = 0
const IODIRA: u8 = 0x00;
const IODIRB: u8 = 0x01;
const GPPUA: u8 = 0x0C;
const GPIOA: u8 = 0x12;
const GPIOB: u8 = 0x13;

// Port A: buttons on 0..=4, red and green backlight on 6 and 7
const BUTTON_MASK: u8 = 0x1F;
const IODIR_A_INPUTS: u8 = 0x3F;
const LED_RED: u8 = 1 << 6;
const LED_GREEN: u8 = 1 << 7;

// Port B (MCP pins 8..=15): blue backlight, then D7..D4, EN, RW, RS
const LED_BLUE: u8 = 1 << 0;
const LCD_D7: u8 = 1 << 1;
const LCD_D6: u8 = 1 << 2;
const LCD_D5: u8 = 1 << 3;
const LCD_D4: u8 = 1 << 4;
const LCD_EN: u8 = 1 << 5;
const LCD_RW: u8 = 1 << 6;
const LCD_RS: u8 = 1 << 7;
const LCD_DATA_MASK: u8 = LCD_D4 | LCD_D5 | LCD_D6 | LCD_D7;

// HD44780 commands
const LCD_CLEARDISPLAY: u8 = 0x01;
const LCD_ENTRYMODESET: u8 = 0x04;
const LCD_DISPLAYCONTROL: u8 = 0x08;
const LCD_CURSORSHIFT: u8 = 0x10;
const LCD_FUNCTIONSET: u8 = 0x20;
const LCD_SETDDRAMADDR: u8 = 0x80;

const LCD_ENTRYLEFT: u8 = 0x02;
const LCD_DISPLAYON: u8 = 0x04;
const LCD_DISPLAYMOVE: u8 = 0x08;
const LCD_MOVERIGHT: u8 = 0x04;
const LCD_MOVELEFT: u8 = 0x00;
const LCD_2LINE: u8 = 0x08;
const LCD_4BITMODE: u8 = 0x00;
const LCD_5X8DOTS: u8 = 0x00;

const LCD_ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// MCP23017 port A pin wired to each plate button
fn button_pin(button: Button) -> u8 {
    match button {
        Button::Select => 0,
        Button::Right => 1,
        Button::Down => 2,
        Button::Up => 3,
        Button::Left => 4,
    }
}

/// Port B data bits for the low nibble of `nibble`
fn nibble_bits(nibble: u8) -> u8 {
    let mut bits = 0;
    if nibble & 0x01 != 0 { bits |= LCD_D4; }
    if nibble & 0x02 != 0 { bits |= LCD_D5; }
    if nibble & 0x04 != 0 { bits |= LCD_D6; }
    if nibble & 0x08 != 0 { bits |= LCD_D7; }
    bits
}

/// Adafruit style RGB character LCD plate.
///
/// The HD44780 runs in 4-bit mode with every control line toggled through
/// port B of the expander, so each nibble costs three bus writes.
pub struct CharLcdPlate<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    columns: usize,
    rows: usize,
    port_a: u8,
    port_b: u8,
}

impl<I2C, D> CharLcdPlate<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Configure the expander and initialize the LCD with the backlight on
    pub fn new(i2c: I2C, delay: D, address: u8, columns: usize, rows: usize) -> Result<Self, DisplayError> {
        if columns == 0 || rows == 0 || rows > LCD_ROW_OFFSETS.len() {
            return Err(DisplayError::InvalidConfiguration(
                format!("Unsupported LCD geometry: {}x{}", columns, rows)
            ));
        }

        let mut plate = Self {
            i2c,
            delay,
            address,
            columns,
            rows,
            port_a: 0,
            port_b: 0,
        };
        plate
            .init()
            .map_err(|e| DisplayError::InitializationFailed(format!("LCD plate at 0x{:02X}: {}", address, e)))?;
        info!("LCD plate {}x{} initialized at address 0x{:02X}", columns, rows, address);
        Ok(plate)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.write_reg(IODIRA, IODIR_A_INPUTS)?;
        self.write_reg(IODIRB, 0x00)?;
        self.write_reg(GPPUA, BUTTON_MASK)?;
        self.set_backlight(true, true, true)?;

        // 8-bit -> 4-bit wake up
        self.write8(0x33, false)?;
        self.write8(0x32, false)?;
        self.write8(LCD_FUNCTIONSET | LCD_4BITMODE | LCD_2LINE | LCD_5X8DOTS, false)?;
        self.write8(LCD_DISPLAYCONTROL | LCD_DISPLAYON, false)?;
        self.write8(LCD_ENTRYMODESET | LCD_ENTRYLEFT, false)?;
        self.clear_display()
    }

    fn clear_display(&mut self) -> Result<(), DisplayError> {
        self.write8(LCD_CLEARDISPLAY, false)?;
        // clear needs well over a millisecond
        self.delay.delay_ms(3);
        Ok(())
    }

    /// Backlight LEDs are active low
    pub fn set_backlight(&mut self, red: bool, green: bool, blue: bool) -> Result<(), DisplayError> {
        self.port_a = (self.port_a & !(LED_RED | LED_GREEN))
            | if red { 0 } else { LED_RED }
            | if green { 0 } else { LED_GREEN };
        self.port_b = (self.port_b & !LED_BLUE) | if blue { 0 } else { LED_BLUE };
        self.write_reg(GPIOA, self.port_a)?;
        self.write_reg(GPIOB, self.port_b)
    }

    /// Give back the bus and delay provider
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|e| DisplayError::I2cError(format!("write 0x{:02X}: {:?}", reg, e)))
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, DisplayError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|e| DisplayError::I2cError(format!("read 0x{:02X}: {:?}", reg, e)))?;
        Ok(buf[0])
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        self.port_b = (self.port_b & !LCD_DATA_MASK) | nibble_bits(nibble);
        self.pulse_enable()
    }

    fn pulse_enable(&mut self) -> Result<(), DisplayError> {
        self.port_b &= !LCD_EN;
        self.write_reg(GPIOB, self.port_b)?;
        self.delay.delay_us(1);
        self.port_b |= LCD_EN;
        self.write_reg(GPIOB, self.port_b)?;
        self.delay.delay_us(1);
        self.port_b &= !LCD_EN;
        self.write_reg(GPIOB, self.port_b)?;
        self.delay.delay_us(1);
        Ok(())
    }

    fn write8(&mut self, value: u8, char_mode: bool) -> Result<(), DisplayError> {
        self.delay.delay_us(1000);
        self.port_b &= !LCD_RW;
        if char_mode {
            self.port_b |= LCD_RS;
        } else {
            self.port_b &= !LCD_RS;
        }
        self.write_nibble(value >> 4)?;
        self.write_nibble(value & 0x0F)
    }

    fn set_cursor(&mut self, column: usize, row: usize) -> Result<(), DisplayError> {
        let row = row.min(self.rows - 1);
        let address = LCD_ROW_OFFSETS[row].wrapping_add(column as u8);
        self.write8(LCD_SETDDRAMADDR | address, false)
    }
}

impl<I2C, D> CharDisplay for CharLcdPlate<I2C, D>
where
    I2C: I2c + Send,
    D: DelayNs + Send,
{
    fn columns(&self) -> usize {
        self.columns
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.clear_display()
    }

    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut row = 0;
        for ch in text.chars() {
            if ch == '\n' {
                row += 1;
                self.set_cursor(0, row)?;
            } else {
                // the HD44780 ROM only covers ASCII reliably
                let byte = if ch.is_ascii() { ch as u8 } else { b'?' };
                self.write8(byte, true)?;
            }
        }
        Ok(())
    }

    fn scroll_step(&mut self, direction: ScrollDirection) -> Result<(), DisplayError> {
        let shift = match direction {
            ScrollDirection::Left => LCD_MOVELEFT,
            ScrollDirection::Right => LCD_MOVERIGHT,
        };
        debug!("LCD shift {:?}", direction);
        self.write8(LCD_CURSORSHIFT | LCD_DISPLAYMOVE | shift, false)
    }
}

impl<I2C, D> InputSource for CharLcdPlate<I2C, D>
where
    I2C: I2c + Send,
    D: DelayNs + Send,
{
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError> {
        let port = self.read_reg(GPIOA)?;
        // pulled up, pressed reads low
        Ok(port & (1 << button_pin(button)) == 0)
    }
}

/// Plate on a Linux I2C character device
#[cfg(feature = "driver-plate")]
pub type LinuxPlate = CharLcdPlate<linux_embedded_hal::I2cdev, linux_embedded_hal::Delay>;

#[cfg(feature = "driver-plate")]
impl LinuxPlate {
    /// Open the plate on `i2c_bus_path` (e.g. "/dev/i2c-1")
    pub fn open(i2c_bus_path: &str, address: u8, columns: usize, rows: usize) -> Result<LinuxPlate, DisplayError> {
        info!("Opening LCD plate on {} at address 0x{:02X}", i2c_bus_path, address);
        let i2c = linux_embedded_hal::I2cdev::new(i2c_bus_path)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", i2c_bus_path, e)))?;
        Self::new(i2c, linux_embedded_hal::Delay, address, columns, rows)
    }
}
