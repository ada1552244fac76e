//! Configuration, filesystem paths and logging setup for the rlvt tracker.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    TrackerConfig, DEFAULT_COLLECTOR_HOST, DEFAULT_LOG_LEVEL, DEFAULT_MAX_EVENT_AGE_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRIES_PER_TICK, DEFAULT_RETRY_INTERVAL_SECS,
    DEFAULT_USER_AGENT,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, parse_level, try_parse_level};
pub use paths::Paths;
