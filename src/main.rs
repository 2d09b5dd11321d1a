/*
 *  main.rs
 *
 *  TMinus - counting down on sixteen columns
 *  (c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::sync::Arc;
use anyhow::Context;
use env_logger::Env;
use log::info;
use tokio::sync::Mutex as TokMutex;

use tminus::config::{self, DisplayConfig};
use tminus::events::EventCatalog;
use tminus::lcd::LcdFactory;
use tminus::shutdown;
use tminus::switcher::EventSwitcher;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (cfg, _cli) = config::load().context("failed to load configuration")?;

    // Initialize the logger with the configured level, info unless told otherwise
    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let catalog = EventCatalog::from_config(cfg.events(), cfg.date_format())
        .context("invalid event catalog")?;
    for (i, event) in catalog.iter().enumerate() {
        info!("  [{}] {} at {}", i, event.name, event.target);
    }

    let display_config = cfg.display.clone().unwrap_or_else(DisplayConfig::default);
    let lcd = LcdFactory::create_from_config(&display_config)
        .context("failed to open display")?;

    // one device serves both the buttons and the display
    let lcd = Arc::new(TokMutex::new(lcd));
    let mut switcher = EventSwitcher::new(catalog, Arc::clone(&lcd), lcd, cfg.timing());

    // handlers go in before the first step so an early signal still says goodbye
    let shutdown = shutdown::listen().context("failed to install signal handlers")?;

    switcher.run_loop(shutdown).await.context("display failure")?;
    Ok(())
}
