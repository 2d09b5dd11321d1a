/*
 *  refresh.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cancellable periodic countdown renderer for a single event
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

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::{block_in_place, JoinHandle};
use tokio::time::sleep;

use crate::cancel::CancelSignal;
use crate::countdown;
use crate::events::Event;
use crate::lcd::{CharDisplay, DisplayError, SharedLcd};
use crate::scroll;

const REFRESH_INTERVAL_SECS: u64 = 60;
const DEBOUNCE_MILLIS: u64 = 1000;
const POLL_MILLIS: u64 = 50;

/// Source of "now"; swapped for a fixed instant in tests
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Refresh, scroll and control loop cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Longest wait between renders; cut short by a cancel
    pub refresh_interval: Duration,
    pub scroll_pre_pause: Duration,
    pub scroll_post_pause: Duration,
    /// Pause after starting a task before buttons are read again
    pub debounce: Duration,
    /// Pause between button polls while a task is running
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            scroll_pre_pause: Duration::from_millis(scroll::PRE_PAUSE_MILLIS),
            scroll_post_pause: Duration::from_millis(scroll::POST_PAUSE_MILLIS),
            debounce: Duration::from_millis(DEBOUNCE_MILLIS),
            poll_interval: Duration::from_millis(POLL_MILLIS),
        }
    }
}

/// Run a driver call that may sleep the thread, as the plate's bus delays do.
///
/// On the multi-thread runtime the worker hands its other tasks off first;
/// anywhere else the call runs in place.
pub fn device_io<R>(f: impl FnOnce() -> R) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => block_in_place(f),
        _ => f(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    NotStarted,
    Running,
    Stopped,
}

/// Render `event` until `signal` is requested.
///
/// The signal is only looked at between render cycles: a scroll sweep that
/// has begun always runs to completion. Display errors end the loop and are
/// returned as is.
pub async fn run<D: CharDisplay>(
    signal: CancelSignal,
    display: SharedLcd<D>,
    event: Event,
    timing: Timing,
    clock: Clock,
) -> Result<(), DisplayError> {
    while !signal.is_requested() {
        info!("Event: {}", event.name);

        let countdown = {
            let mut lcd = display.lock().await;
            device_io(|| -> Result<countdown::Countdown, DisplayError> {
                lcd.clear()?;
                let countdown = countdown::format(clock(), event.target, &event.name, lcd.columns());
                lcd.write_message(&countdown.text)?;
                Ok(countdown)
            })?
        };
        debug!("{:?} -> {:?}", event.name, countdown.line);

        if countdown.overflowing {
            let columns = display.lock().await.columns();
            let plan = scroll::plan_with_pauses(
                columns,
                countdown.scroll_length(),
                timing.scroll_pre_pause,
                timing.scroll_post_pause,
            );
            for step in plan {
                sleep(step.pre_pause).await;
                let mut lcd = display.lock().await;
                device_io(|| lcd.scroll_step(step.direction))?;
                drop(lcd);
                sleep(step.post_pause).await;
            }
        }

        if signal.wait_timeout(timing.refresh_interval).await {
            break;
        }
    }
    debug!("{} refresh exiting.", event.name);
    Ok(())
}

/// Handle on one event's refresh loop.
///
/// Created not started; `start` spawns the loop, `stop` requests the cancel
/// and waits for the loop to exit. A task is never restarted once stopped.
pub struct RefreshTask<D> {
    event: Event,
    signal: CancelSignal,
    display: SharedLcd<D>,
    timing: Timing,
    clock: Clock,
    task_handle: Option<JoinHandle<Result<(), DisplayError>>>,
    joined: bool,
}

impl<D: CharDisplay + 'static> RefreshTask<D> {
    /// A not-yet-started task with its own fresh signal
    pub fn new(event: Event, display: SharedLcd<D>, timing: Timing) -> Self {
        Self {
            event,
            signal: CancelSignal::new(),
            display,
            timing,
            clock: local_now,
            task_handle: None,
            joined: false,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn signal(&self) -> &CancelSignal {
        &self.signal
    }

    pub fn state(&self) -> TaskState {
        match &self.task_handle {
            None if self.joined => TaskState::Stopped,
            None => TaskState::NotStarted,
            Some(handle) if handle.is_finished() => TaskState::Stopped,
            Some(_) => TaskState::Running,
        }
    }

    /// Spawn the loop. Returns false if the task was already started.
    pub fn start(&mut self) -> bool {
        if self.state() != TaskState::NotStarted {
            warn!("{} task already started, not spawning again.", self.event.name);
            return false;
        }
        debug!("{} task init...", self.event.name);
        self.signal.reset();

        let handle = tokio::spawn(run(
            self.signal.clone(),
            self.display.clone(),
            self.event.clone(),
            self.timing,
            self.clock,
        ));
        self.task_handle = Some(handle);
        true
    }

    pub fn cancel(&self) {
        self.signal.request();
    }

    /// Wait for the loop to exit and hand back its result.
    /// A no-op for a task that was never started.
    pub async fn join(&mut self) -> Result<(), DisplayError> {
        match self.task_handle.take() {
            Some(handle) => {
                self.joined = true;
                let result = handle.await?;
                debug!("{} task joined.", self.event.name);
                result
            }
            None => Ok(()),
        }
    }

    /// Request cancel and block until the loop has exited
    pub async fn stop(&mut self) -> Result<(), DisplayError> {
        debug!("{} stopping...", self.event.name);
        self.cancel();
        self.join().await
    }
}

impl<D> Drop for RefreshTask<D> {
    fn drop(&mut self) {
        // stop() is async so it cannot run here; the switcher always stops
        // explicitly, this only covers early returns and panics
        if let Some(handle) = self.task_handle.take() {
            self.signal.request();
            handle.abort();
            debug!("RefreshTask dropped, ensuring task is aborted.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::ScrollDirection;
    use crate::lcd::drivers::mock::MockLcd;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::sync::Mutex as TokMutex;
    use tokio::time::Instant;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2029, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn event(name: &str) -> Event {
        Event::new(name, NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn task(name: &str, lcd: &MockLcd) -> RefreshTask<MockLcd> {
        RefreshTask::new(event(name), Arc::new(TokMutex::new(lcd.clone())), Timing::default())
            .with_clock(fixed_now)
    }

    #[test]
    fn test_device_io_outside_runtime() {
        assert_eq!(device_io(|| 7), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_renders_on_multi_thread_runtime() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        assert!(t.start());
        tokio::time::sleep(Duration::from_millis(50)).await;
        t.stop().await.unwrap();

        let state = lcd.state();
        let state = state.lock().unwrap();
        assert_eq!(state.messages(), vec!["A in\n1 day 0 hours".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_machine() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        assert_eq!(t.state(), TaskState::NotStarted);

        assert!(t.start());
        assert_eq!(t.state(), TaskState::Running);
        assert!(!t.start());

        t.stop().await.unwrap();
        assert_eq!(t.state(), TaskState::Stopped);
        assert!(!t.start());
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_then_waits() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        t.start();

        sleep(Duration::from_secs(1)).await;
        {
            let state = lcd.state();
            let state = state.lock().unwrap();
            assert_eq!(state.clear_count, 1);
            assert_eq!(state.messages(), vec!["A in\n1 day 0 hours".to_string()]);
            assert!(state.scrolls().is_empty());
        }
        t.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_every_interval() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        t.start();

        sleep(Duration::from_secs(125)).await;
        assert_eq!(lcd.state().lock().unwrap().messages().len(), 3);
        t.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_cuts_the_wait_short() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        t.start();
        sleep(Duration::from_secs(2)).await;

        let start = Instant::now();
        t.stop().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(lcd.state().lock().unwrap().messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_scrolls_out_and_back() {
        let lcd = MockLcd::new(16);
        let mut t = task("Very Long Event Name", &lcd);
        t.start();

        // 8 steps at 1.5s each
        sleep(Duration::from_secs(13)).await;
        {
            let state = lcd.state();
            let state = state.lock().unwrap();
            let scrolls = state.scrolls();
            assert_eq!(scrolls.len(), 8);
            assert!(scrolls[..4].iter().all(|d| *d == ScrollDirection::Left));
            assert!(scrolls[4..].iter().all(|d| *d == ScrollDirection::Right));
            assert_eq!(state.offset, 0);
        }
        t.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_waits_for_scroll_sweep() {
        let lcd = MockLcd::new(16);
        let mut t = task("Very Long Event Name", &lcd);
        t.start();
        sleep(Duration::from_secs(1)).await;

        // requested mid sweep: the remaining steps still run
        let start = Instant::now();
        t.stop().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert_eq!(lcd.state().lock().unwrap().scrolls().len(), 8);
        assert_eq!(lcd.state().lock().unwrap().messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_failure_propagates() {
        let lcd = MockLcd::new(16);
        lcd.state().lock().unwrap().simulate_write_failure = true;
        let mut t = task("A", &lcd);
        t.start();

        sleep(Duration::from_millis(10)).await;
        assert_eq!(t.state(), TaskState::Stopped);
        assert!(t.join().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_without_start_is_noop() {
        let lcd = MockLcd::new(16);
        let mut t = task("A", &lcd);
        t.join().await.unwrap();
        assert_eq!(t.state(), TaskState::NotStarted);
        assert!(lcd.state().lock().unwrap().calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_immediately_when_already_requested() {
        let lcd = MockLcd::new(16);
        let signal = CancelSignal::new();
        signal.request();
        run(signal, Arc::new(TokMutex::new(lcd.clone())), event("A"), Timing::default(), fixed_now)
            .await
            .unwrap();
        assert!(lcd.state().lock().unwrap().calls.is_empty());
    }
}
