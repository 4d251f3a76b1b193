//! Console-backed sink for the `log` facade.
//!
//! Installed once per page by the wasm entry points; before that every `log`
//! macro in the crate is a no-op, which is what native tests rely on.

use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{CardError, Result};

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

pub struct ConsoleLogger {
    level: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        let line = wasm_bindgen::JsValue::from_str(&line);
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Map a level name to a filter. Accepts the usual names, case-insensitive.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" | "warning" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" => Ok(LevelFilter::Off),
        other => Err(CardError::LoggingInit(format!(
            "unsupported log level `{other}`"
        ))),
    }
}

/// Install the console logger.
///
/// Repeated calls with the same level are accepted; a different level after
/// the first install is rejected.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = parse_level(level)?;
    if let Some(existing) = LOGGER.get() {
        if existing.level == filter {
            return Ok(());
        }
        return Err(CardError::LoggingInit(format!(
            "logging already initialized at `{}`; refusing to switch to `{filter}`",
            existing.level
        )));
    }
    let logger = LOGGER.get_or_init(|| ConsoleLogger { level: filter });
    log::set_logger(logger).map_err(|err| CardError::LoggingInit(err.to_string()))?;
    log::set_max_level(logger.level);
    Ok(())
}
