/*
 *  tests/countdown_integration.rs
 *
 *  Integration tests for the countdown pipeline
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Mutex as TokMutex;
use tokio::time::{sleep, Instant};

use tminus::config::parse_yaml;
use tminus::countdown;
use tminus::events::{CatalogError, EventCatalog};
use tminus::lcd::drivers::console::ConsoleLcd;
use tminus::lcd::drivers::mock::{MockButtons, MockLcd};
use tminus::lcd::{Button, ScrollDirection};
use tminus::scroll;
use tminus::{EventSwitcher, TaskState, Timing};

const CONFIG: &str = r#"
events:
  - name: A
    date: 01/01/2030
  - name: Very Long Event Name
    date: 01/11/2030
  - name: C
    date: 02/01/2030
display:
  columns: 16
"#;

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2029, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

fn catalog() -> EventCatalog {
    let cfg = parse_yaml(CONFIG).unwrap();
    EventCatalog::from_config(cfg.events(), cfg.date_format()).unwrap()
}

#[test]
fn test_config_to_first_message() {
    let catalog = catalog();
    let event = catalog.get(0);
    let c = countdown::format(fixed_now(), event.target, &event.name, 16);
    assert_eq!(c.text, "A in\n1 day 0 hours");
}

#[test]
fn test_long_name_plan() {
    let catalog = catalog();
    let event = catalog.get(1);
    let c = countdown::format(fixed_now(), event.target, &event.name, 16);
    assert!(c.overflowing);
    assert_eq!(scroll::plan(16, c.scroll_length()).count(), 8);
}

#[test]
fn test_bad_config_dates_abort() {
    let cfg = parse_yaml("events:\n  - name: X\n    date: 31/12/2030\n").unwrap();
    assert!(matches!(
        EventCatalog::from_config(cfg.events(), cfg.date_format()),
        Err(CatalogError::InvalidDate { .. })
    ));
    let cfg = parse_yaml("log_level: info\n").unwrap();
    assert!(matches!(
        EventCatalog::from_config(cfg.events(), cfg.date_format()),
        Err(CatalogError::Empty)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cycle_through_catalog_on_mock() {
    let lcd = MockLcd::new(16);
    let buttons = MockButtons::new();
    let mut switcher = EventSwitcher::new(
        catalog(),
        Arc::new(TokMutex::new(buttons.clone())),
        Arc::new(TokMutex::new(lcd.clone())),
        Timing::default(),
    )
    .with_clock(fixed_now);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let script = async {
        sleep(Duration::from_secs(2)).await;
        buttons.press(Button::Up);
        // long name sweeps for 12s before it can be cancelled
        sleep(Duration::from_secs(5)).await;
        buttons.press(Button::Up);
        sleep(Duration::from_secs(20)).await;
        let _ = stop_tx.send(());
    };

    let (result, _) = tokio::join!(
        switcher.run_loop(async {
            let _ = stop_rx.await;
        }),
        script
    );
    result.unwrap();

    let state = lcd.state();
    let state = state.lock().unwrap();
    let names: Vec<String> = state
        .messages()
        .iter()
        .map(|m| m.lines().next().unwrap_or("").to_string())
        .collect();
    assert_eq!(names, vec!["A in", "Very Long Event Name in", "C in"]);

    // the sweep completed before C took over
    let scrolls = state.scrolls();
    assert_eq!(scrolls.len(), 8);
    assert_eq!(scrolls.iter().filter(|d| **d == ScrollDirection::Left).count(), 4);
    assert_eq!(switcher.index(), 2);
    assert_eq!(switcher.current_state(), None);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_is_bounded() {
    let lcd = MockLcd::new(16);
    let buttons = MockButtons::new();
    let timing = Timing::default();
    let mut switcher = EventSwitcher::new(
        catalog(),
        Arc::new(TokMutex::new(buttons.clone())),
        Arc::new(TokMutex::new(lcd.clone())),
        timing,
    )
    .with_clock(fixed_now);

    switcher.step().await.unwrap();
    assert_eq!(switcher.current_state(), Some(TaskState::Running));
    sleep(Duration::from_secs(30)).await;

    let start = Instant::now();
    switcher.shutdown().await.unwrap();
    assert!(start.elapsed() <= timing.refresh_interval);
}

#[tokio::test(start_paused = true)]
async fn test_console_emulator_end_to_end() {
    let console = ConsoleLcd::new(16, 2, Vec::new());
    console.press(Button::Down);
    let lcd = Arc::new(TokMutex::new(console));
    let mut switcher = EventSwitcher::new(catalog(), Arc::clone(&lcd), Arc::clone(&lcd), Timing::default())
        .with_clock(fixed_now);

    switcher.run_loop(sleep(Duration::from_secs(3))).await.unwrap();
    assert_eq!(switcher.index(), 2);

    let rows = lcd.lock().await.visible_rows();
    assert_eq!(rows[0], "C in            ");
    assert_eq!(rows[1], "32 days 0 hours ");
}
