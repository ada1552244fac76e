//! Logging initialization for tracker host processes.
//!
//! The library crates only emit `tracing` events. Binaries call
//! [`init_logging`] once to install a subscriber through the
//! observability crate.

use observability::{LogConfig, LogFormat};
use std::path::PathBuf;

/// Initialize the logging system.
///
/// - Level from `RUST_LOG` or the provided default
/// - Format from `RLVT_LOG_FORMAT` (`json` or `compact`)
/// - Output appended to `log_file` when given, stderr otherwise
///
/// # Example
///
/// ```ignore
/// init_logging("info", None);
/// tracing::info!("tracker started");
/// ```
pub fn init_logging(level: &str, log_file: Option<PathBuf>) -> bool {
    let format = std::env::var("RLVT_LOG_FORMAT")
        .map(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();

    observability::init_with_config(LogConfig {
        service_name: "rlvt".into(),
        default_level: level.into(),
        format,
        log_path: log_file,
    })
}

/// Parse a log level string into a tracing Level, `INFO` when unknown.
pub fn parse_level(level: &str) -> tracing::Level {
    try_parse_level(level).unwrap_or(tracing::Level::INFO)
}

/// Parse a log level string, or `None` when it names no level.
pub fn try_parse_level(level: &str) -> Option<tracing::Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(tracing::Level::TRACE),
        "debug" => Some(tracing::Level::DEBUG),
        "info" => Some(tracing::Level::INFO),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "error" => Some(tracing::Level::ERROR),
        _ => None,
    }
}
