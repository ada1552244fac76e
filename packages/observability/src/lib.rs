//! # Observability
//!
//! Process-wide logging setup for hosts that embed the tracker.
//!
//! The tracker crates are **log producers** only. They emit structured
//! events through the standard `tracing` macros and never install a
//! subscriber themselves. A host binary calls `observability::init()` once
//! at startup to decide where those events go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("rlvt");
//!     tracing::info!("ready");
//! }
//! ```
//!
//! Or with configuration:
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "rlvt".into(),
//!     default_level: "debug".into(),
//!     format: observability::LogFormat::Json,
//!     ..Default::default()
//! });
//! ```

mod file_writer;

use std::path::PathBuf;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub use file_writer::{AppendLogWriter, AppendWriterFactory};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to `Compact` for unknown values.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, logged once the subscriber is installed.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Output format.
    pub format: LogFormat,

    /// Append log lines to this file instead of stderr.
    pub log_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            format: LogFormat::Compact,
            log_path: None,
        }
    }
}

/// Initialize the observability layer with default settings.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(service_name: &str) -> bool {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize the observability layer with custom configuration.
///
/// If the log file cannot be opened, logging falls back to stderr.
/// Returns `false` if a global subscriber was already installed.
pub fn init_with_config(config: LogConfig) -> bool {
    let filter = build_filter(&config.default_level);

    let writer = match config.log_path.as_ref().map(AppendLogWriter::new) {
        Some(Ok(writer)) => Some(AppendWriterFactory::new(writer)),
        Some(Err(err)) => {
            eprintln!(
                "observability: cannot open log file, using stderr: {}",
                err
            );
            None
        }
        None => None,
    };

    let installed = match (config.format, writer) {
        (LogFormat::Json, Some(writer)) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .finish()
            .try_init()
            .is_ok(),
        (LogFormat::Json, None) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .finish()
            .try_init()
            .is_ok(),
        (LogFormat::Compact, Some(writer)) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .compact()
            .with_writer(writer)
            .finish()
            .try_init()
            .is_ok(),
        (LogFormat::Compact, None) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .finish()
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(service = %config.service_name, "logging initialized");
    }
    installed
}

/// Build the level filter, letting `RUST_LOG` win over the configured default.
fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
/// Services can use `observability::info!()` or `tracing::info!()`.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSONL "), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Compact);
        assert_eq!(LogFormat::parse(""), LogFormat::Compact);
    }
}
