/*
 *  switcher.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button driven control loop that hands the display between events
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

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::sleep;

use crate::events::EventCatalog;
use crate::lcd::{Button, CharDisplay, DisplayError, InputSource, SharedLcd};
use crate::refresh::{Clock, RefreshTask, TaskState, Timing, device_io, local_now};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchRequest {
    Next,
    Previous,
}

/// Owns the one live refresh task.
///
/// A switch always stops and joins the current task before the next one is
/// created, so two tasks never write to the display at the same time.
pub struct EventSwitcher<D, I> {
    catalog: EventCatalog,
    input: SharedLcd<I>,
    display: SharedLcd<D>,
    timing: Timing,
    clock: Clock,
    index: usize,
    current: Option<RefreshTask<D>>,
}

impl<D, I> EventSwitcher<D, I>
where
    D: CharDisplay + 'static,
    I: InputSource + 'static,
{
    pub fn new(catalog: EventCatalog, input: SharedLcd<I>, display: SharedLcd<D>, timing: Timing) -> Self {
        Self {
            catalog,
            input,
            display,
            timing,
            clock: local_now,
            index: 0,
            current: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Index of the selected event
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_state(&self) -> Option<TaskState> {
        self.current.as_ref().map(|task| task.state())
    }

    /// Read both buttons; Up wins when both are down
    async fn poll_input(&self) -> Result<Option<SwitchRequest>, DisplayError> {
        let mut input = self.input.lock().await;
        device_io(|| -> Result<Option<SwitchRequest>, DisplayError> {
            if input.is_pressed(Button::Up)? {
                return Ok(Some(SwitchRequest::Next));
            }
            if input.is_pressed(Button::Down)? {
                return Ok(Some(SwitchRequest::Previous));
            }
            Ok(None)
        })
    }

    fn new_task(&self) -> RefreshTask<D> {
        RefreshTask::new(self.catalog.get(self.index).clone(), self.display.clone(), self.timing)
            .with_clock(self.clock)
    }

    /// Move the selection, stop and join the old task, stage a new one
    pub async fn switch(&mut self, request: SwitchRequest) -> Result<(), DisplayError> {
        self.index = match request {
            SwitchRequest::Next => self.catalog.next(self.index),
            SwitchRequest::Previous => self.catalog.previous(self.index),
        };
        if let Some(mut task) = self.current.take() {
            task.stop().await?;
        }
        info!("Switched to event {} of {}: {}",
            self.index + 1, self.catalog.len(), self.catalog.get(self.index).name);
        self.current = Some(self.new_task());
        Ok(())
    }

    fn start_current(&mut self) -> Duration {
        if self.current.is_none() {
            self.current = Some(self.new_task());
        }
        if let Some(task) = self.current.as_mut() {
            task.start();
        }
        self.timing.debounce
    }

    /// One pass of the control loop. Returns how long to pause before the next.
    pub async fn step(&mut self) -> Result<Duration, DisplayError> {
        if let Some(request) = self.poll_input().await? {
            debug!("button request {:?}", request);
            self.switch(request).await?;
        }

        match self.current_state() {
            Some(TaskState::Running) => Ok(self.timing.poll_interval),
            Some(TaskState::Stopped) => {
                // only a failing display ends a task nobody cancelled
                if let Some(mut task) = self.current.take() {
                    task.join().await?;
                    warn!("{} refresh ended without a cancel, restarting", task.event().name);
                }
                Ok(self.start_current())
            }
            Some(TaskState::NotStarted) | None => Ok(self.start_current()),
        }
    }

    /// Poll until `shutdown` resolves, then stop the live task.
    ///
    /// Display errors from the task or the buttons end the loop.
    pub async fn run_loop<F>(&mut self, shutdown: F) -> Result<(), DisplayError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Counting down {} event(s)", self.catalog.len());

        loop {
            let pause = match self.step().await {
                Ok(pause) => pause,
                Err(e) => {
                    // leave nothing running behind the error
                    self.current.take();
                    return Err(e);
                }
            };
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = sleep(pause) => {}
            }
        }

        self.shutdown().await
    }

    /// Cancel and join whatever is live
    pub async fn shutdown(&mut self) -> Result<(), DisplayError> {
        if let Some(mut task) = self.current.take() {
            if task.state() == TaskState::Running {
                task.stop().await?;
            } else {
                task.join().await?;
            }
        }
        info!("Count Down Ended.  Goodbye!");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::lcd::drivers::mock::{MockButtons, MockLcd};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;
    use tokio::sync::Mutex as TokMutex;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2029, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn catalog(names: &[&str]) -> EventCatalog {
        let target = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        EventCatalog::new(names.iter().map(|n| Event::new(*n, target)).collect()).unwrap()
    }

    fn switcher(names: &[&str], lcd: &MockLcd, buttons: &MockButtons) -> EventSwitcher<MockLcd, MockButtons> {
        EventSwitcher::new(
            catalog(names),
            Arc::new(TokMutex::new(buttons.clone())),
            Arc::new(TokMutex::new(lcd.clone())),
            Timing::default(),
        )
        .with_clock(fixed_now)
    }

    fn first_lines(lcd: &MockLcd) -> Vec<String> {
        lcd.state()
            .lock()
            .unwrap()
            .messages()
            .iter()
            .map(|m| m.lines().next().unwrap_or("").to_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_step_starts_first_event() {
        let lcd = MockLcd::new(16);
        let buttons = MockButtons::new();
        let mut s = switcher(&["A", "B"], &lcd, &buttons);
        assert_eq!(s.current_state(), None);

        let pause = s.step().await.unwrap();
        assert_eq!(pause, Duration::from_secs(1));
        assert_eq!(s.current_state(), Some(TaskState::Running));

        let pause = s.step().await.unwrap();
        assert_eq!(pause, Duration::from_millis(50));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(first_lines(&lcd), vec!["A in"]);
        s.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_previous_from_first_wraps_to_last() {
        let lcd = MockLcd::new(16);
        let buttons = MockButtons::new();
        let mut s = switcher(&["A", "B", "C"], &lcd, &buttons);
        s.step().await.unwrap();

        buttons.press(Button::Down);
        s.step().await.unwrap();
        assert_eq!(s.index(), 2);

        buttons.press(Button::Up);
        s.step().await.unwrap();
        assert_eq!(s.index(), 0);
        s.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_joins_before_starting_next() {
        let lcd = MockLcd::new(16);
        let buttons = MockButtons::new();
        let mut s = switcher(&["A", "B"], &lcd, &buttons);
        s.step().await.unwrap();
        sleep(Duration::from_millis(10)).await;

        s.switch(SwitchRequest::Next).await.unwrap();
        // old task is gone, new one staged but not yet running
        assert_eq!(s.current_state(), Some(TaskState::NotStarted));
        s.step().await.unwrap();
        assert_eq!(s.current_state(), Some(TaskState::Running));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(first_lines(&lcd), vec!["A in", "B in"]);
        s.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_sequence_never_interleaves() {
        let lcd = MockLcd::new(16);
        let buttons = MockButtons::new();
        let mut s = switcher(&["A", "B", "C"], &lcd, &buttons);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let script = async {
            for button in [Button::Up, Button::Up, Button::Down, Button::Down, Button::Down] {
                sleep(Duration::from_secs(3)).await;
                buttons.press(button);
            }
            sleep(Duration::from_secs(3)).await;
            let _ = stop_tx.send(());
        };
        let shutdown = async {
            let _ = stop_rx.await;
        };

        let (result, _) = tokio::join!(s.run_loop(shutdown), script);
        result.unwrap();

        assert_eq!(first_lines(&lcd), vec!["A in", "B in", "C in", "B in", "A in", "C in"]);
        assert_eq!(s.index(), 2);
        assert_eq!(s.current_state(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_held_button_repeats_once_per_debounce() {
        let lcd = MockLcd::new(16);
        let held = MockLcd::new(16);
        held.state().lock().unwrap().held.insert(Button::Up);
        let mut s = EventSwitcher::new(
            catalog(&["A", "B", "C"]),
            Arc::new(TokMutex::new(held.clone())),
            Arc::new(TokMutex::new(lcd.clone())),
            Timing::default(),
        )
        .with_clock(fixed_now);

        let script = async {
            sleep(Duration::from_millis(2500)).await;
            held.state().lock().unwrap().held.clear();
        };
        let (result, _) = tokio::join!(s.run_loop(sleep(Duration::from_secs(5))), script);
        result.unwrap();

        assert_eq!(first_lines(&lcd), vec!["B in", "C in", "A in"]);
        assert_eq!(s.index(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_running_task() {
        let lcd = MockLcd::new(16);
        let buttons = MockButtons::new();
        let mut s = switcher(&["A"], &lcd, &buttons);

        let shutdown = sleep(Duration::from_secs(5));
        s.run_loop(shutdown).await.unwrap();
        assert_eq!(s.current_state(), None);

        // nothing renders after shutdown
        let before = lcd.state().lock().unwrap().calls.len();
        sleep(Duration::from_secs(120)).await;
        assert_eq!(lcd.state().lock().unwrap().calls.len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_failure_ends_loop() {
        let lcd = MockLcd::new(16);
        lcd.state().lock().unwrap().simulate_write_failure = true;
        let buttons = MockButtons::new();
        let mut s = switcher(&["A"], &lcd, &buttons);

        let result = s.run_loop(sleep(Duration::from_secs(600))).await;
        assert!(result.is_err());
    }
}
