/*
 *  lcd/drivers/console.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Console emulator for desktop testing without an LCD plate
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

use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::lcd::error::DisplayError;
use crate::lcd::traits::{Button, CharDisplay, InputSource, ScrollDirection};

/// Map a line typed on stdin to a button
pub fn parse_key(line: &str) -> Option<Button> {
    match line.trim().to_lowercase().as_str() {
        "u" | "up" | "+" | "n" => Some(Button::Up),
        "d" | "down" | "-" | "p" => Some(Button::Down),
        "s" | "select" => Some(Button::Select),
        "l" | "left" => Some(Button::Left),
        "r" | "right" => Some(Button::Right),
        _ => None,
    }
}

/// Console emulated character LCD.
///
/// Keeps the same window model as an HD44780: the message is written from the
/// home position and scroll steps shift which columns are visible. Each change
/// redraws a boxed frame to the writer.
pub struct ConsoleLcd<W: Write + Send> {
    columns: usize,
    rows: usize,
    lines: Vec<String>,
    /// first visible column of the message
    start: i32,
    out: W,
    pressed: Arc<Mutex<HashSet<Button>>>,
}

impl ConsoleLcd<std::io::Stdout> {
    /// Emulator on stdout with buttons read from stdin
    pub fn stdio(columns: usize, rows: usize) -> Self {
        let lcd = Self::new(columns, rows, std::io::stdout());
        lcd.listen_stdin();
        info!("Console LCD {}x{} ready: type u/+ for next event, d/- for previous", columns, rows);
        lcd
    }
}

impl<W: Write + Send> ConsoleLcd<W> {
    pub fn new(columns: usize, rows: usize, out: W) -> Self {
        Self {
            columns,
            rows,
            lines: Vec::new(),
            start: 0,
            out,
            pressed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Queue a button press as if it were typed
    pub fn press(&self, button: Button) {
        if let Ok(mut pressed) = self.pressed.lock() {
            pressed.insert(button);
        }
    }

    /// The text currently visible, one string per row
    pub fn visible_rows(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                let line = self.lines.get(row).map(String::as_str).unwrap_or("");
                let visible: String = if self.start >= 0 {
                    line.chars().skip(self.start as usize).take(self.columns).collect()
                } else {
                    let pad = (-self.start) as usize;
                    " ".repeat(pad.min(self.columns))
                        .chars()
                        .chain(line.chars())
                        .take(self.columns)
                        .collect()
                };
                format!("{:<width$}", visible, width = self.columns)
            })
            .collect()
    }

    /// Consume the emulator and hand back its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self) -> Result<(), DisplayError> {
        let border = format!("+{}+", "-".repeat(self.columns));
        let mut frame = String::new();
        frame.push_str(&border);
        frame.push('\n');
        for row in self.visible_rows() {
            frame.push('|');
            frame.push_str(&row);
            frame.push_str("|\n");
        }
        frame.push_str(&border);
        frame.push('\n');
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn listen_stdin(&self) {
        let pressed = Arc::clone(&self.pressed);
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("console input closed: {}", e);
                        break;
                    }
                };
                match parse_key(&line) {
                    Some(button) => {
                        debug!("console key {:?}", button);
                        if let Ok(mut set) = pressed.lock() {
                            set.insert(button);
                        }
                    }
                    None => debug!("ignoring console input {:?}", line),
                }
            }
        });
    }
}

impl<W: Write + Send> CharDisplay for ConsoleLcd<W> {
    fn columns(&self) -> usize {
        self.columns
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.lines.clear();
        self.start = 0;
        self.render()
    }

    fn write_message(&mut self, text: &str) -> Result<(), DisplayError> {
        self.lines = text.split('\n').take(self.rows).map(str::to_string).collect();
        self.render()
    }

    fn scroll_step(&mut self, direction: ScrollDirection) -> Result<(), DisplayError> {
        // shifting the display left reveals columns further right
        match direction {
            ScrollDirection::Left => self.start += 1,
            ScrollDirection::Right => self.start -= 1,
        }
        self.render()
    }
}

impl<W: Write + Send> InputSource for ConsoleLcd<W> {
    fn is_pressed(&mut self, button: Button) -> Result<bool, DisplayError> {
        let mut pressed = self.pressed
            .lock()
            .map_err(|_| DisplayError::Other("console button state poisoned".to_string()))?;
        Ok(pressed.remove(&button))
    }
}
