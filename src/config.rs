use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::events::DEFAULT_DATE_FORMAT;
use crate::refresh::Timing;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// chrono format string for event dates
    pub date_format: Option<String>,
    /// events in display order
    pub events: Option<Vec<EventConfig>>,
    /// display-specific geometry & wiring
    pub display: Option<DisplayConfig>,
    /// refresh, scroll and polling cadence
    pub timing: Option<TimingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventConfig {
    pub name: String,
    pub date: String,                  // e.g. "06/22/2015"
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub columns: Option<usize>,
    pub rows: Option<usize>,
    pub driver: Option<DriverKind>,
    pub bus: Option<String>,           // e.g. "/dev/i2c-1"
    pub address: Option<u8>,           // e.g. 0x20
    pub emulated: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingConfig {
    pub refresh_secs: Option<u64>,
    pub scroll_pre_pause_ms: Option<u64>,
    pub scroll_post_pause_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub poll_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Plate,
    Console,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "tminus", version, about = "Event countdown on a character LCD", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Draw to the terminal instead of the LCD plate
    #[arg(long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    #[arg(long)]
    pub columns: Option<usize>,
    /// I2C bus device path for the LCD plate (e.g., /dev/i2c-1)
    #[arg(long)]
    pub i2c_bus: Option<String>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

impl Config {
    pub fn date_format(&self) -> &str {
        self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT)
    }

    pub fn events(&self) -> &[EventConfig] {
        self.events.as_deref().unwrap_or(&[])
    }

    /// Effective cadence, config values over the defaults
    pub fn timing(&self) -> Timing {
        let mut timing = Timing::default();
        if let Some(t) = self.timing.as_ref() {
            if let Some(v) = t.refresh_secs         { timing.refresh_interval = Duration::from_secs(v); }
            if let Some(v) = t.scroll_pre_pause_ms  { timing.scroll_pre_pause = Duration::from_millis(v); }
            if let Some(v) = t.scroll_post_pause_ms { timing.scroll_post_pause = Duration::from_millis(v); }
            if let Some(v) = t.debounce_ms          { timing.debounce = Duration::from_millis(v); }
            if let Some(v) = t.poll_ms              { timing.poll_interval = Duration::from_millis(v); }
        }
        timing
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok((cfg, cli))
}

/// Layer defaults, YAML and `cli` overrides, then validate
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/tminus/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/tminus/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/tminus.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["tminus.yaml", "config.yaml", "config/tminus.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.date_format.is_some()    { dst.date_format = src.date_format; }
    if src.events.is_some()         { dst.events = src.events; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.timing, src.timing) {
        (None, Some(c)) => dst.timing = Some(c),
        (Some(d), Some(s)) => merge_timing(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.columns.is_some()     { dst.columns = src.columns; }
    if src.rows.is_some()        { dst.rows = src.rows; }
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.bus.is_some()         { dst.bus = src.bus; }
    if src.address.is_some()     { dst.address = src.address; }
    if src.emulated.is_some()    { dst.emulated = src.emulated; }
}

fn merge_timing(dst: &mut TimingConfig, src: TimingConfig) {
    if src.refresh_secs.is_some()         { dst.refresh_secs = src.refresh_secs; }
    if src.scroll_pre_pause_ms.is_some()  { dst.scroll_pre_pause_ms = src.scroll_pre_pause_ms; }
    if src.scroll_post_pause_ms.is_some() { dst.scroll_post_pause_ms = src.scroll_post_pause_ms; }
    if src.debounce_ms.is_some()          { dst.debounce_ms = src.debounce_ms; }
    if src.poll_ms.is_some()              { dst.poll_ms = src.poll_ms; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }
    let any_case = cli.columns.is_some()
        || cli.i2c_bus.is_some()
        || cli.emulated;

    if any_case && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.columns.is_some()     { display.columns = cli.columns; }
        if cli.i2c_bus.is_some()     { display.bus = cli.i2c_bus.clone(); }
        if cli.emulated              { display.emulated = Some(true); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.columns == Some(0) {
            return Err(ConfigError::Validation("display columns must be > 0".into()));
        }
        if let Some(rows) = display.rows {
            if !(2..=4).contains(&rows) {
                return Err(ConfigError::Validation("display rows must be 2..=4".into()));
            }
        }
    }
    if let Some(timing) = cfg.timing.as_ref() {
        if timing.refresh_secs == Some(0) {
            return Err(ConfigError::Validation("timing refresh_secs must be > 0".into()));
        }
    }
    if cfg.date_format().is_empty() {
        return Err(ConfigError::Validation("date_format must not be empty".into()));
    }
    Ok(())
}
