//! Tracker configuration.

use crate::{ConfigError, ConfigResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Collector host used to derive the endpoint (can be overridden at compile time via RLVT_COLLECTOR_HOST env var).
pub const DEFAULT_COLLECTOR_HOST: &str = match option_env!("RLVT_COLLECTOR_HOST") {
    Some(host) => host,
    None => "rlvt.example.com",
};

/// Seconds between two retry scheduler ticks.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 60;

/// Queued events older than this are dropped instead of resent.
pub const DEFAULT_MAX_EVENT_AGE_SECS: u64 = 15 * 60;

/// Queue entries drained per scheduler tick.
pub const DEFAULT_RETRIES_PER_TICK: usize = 1;

/// HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Browser-like user agent. The collector filters obvious bot agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

/// Tracker configuration.
///
/// `company_id` and `datasource_id` are fixed for the lifetime of a tracker
/// instance. `current_url` only seeds the tracker's mutable current URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Company identifier, sent as `key` on every event.
    #[serde(default)]
    pub company_id: String,
    /// Datasource identifier, part of the collector path.
    #[serde(default)]
    pub datasource_id: String,
    /// Host the collector subdomain is derived from.
    #[serde(default = "default_collector_host")]
    pub collector_host: String,
    /// Full endpoint override. Takes precedence over `collector_host`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Initial current URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    /// Seconds between retry ticks.
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    /// Maximum age of a queued event before it is dropped.
    #[serde(default = "default_max_event_age_secs")]
    pub max_event_age_secs: u64,
    /// Queue entries drained per tick.
    #[serde(default = "default_retries_per_tick")]
    pub retries_per_tick: usize,
    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_collector_host() -> String {
    DEFAULT_COLLECTOR_HOST.to_string()
}

fn default_retry_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL_SECS
}

fn default_max_event_age_secs() -> u64 {
    DEFAULT_MAX_EVENT_AGE_SECS
}

fn default_retries_per_tick() -> usize {
    DEFAULT_RETRIES_PER_TICK
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl TrackerConfig {
    /// Create a configuration with default values for everything but the ids.
    pub fn new(company_id: impl Into<String>, datasource_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            datasource_id: datasource_id.into(),
            collector_host: default_collector_host(),
            endpoint: None,
            current_url: None,
            retry_interval_secs: DEFAULT_RETRY_INTERVAL_SECS,
            max_event_age_secs: DEFAULT_MAX_EVENT_AGE_SECS,
            retries_per_tick: DEFAULT_RETRIES_PER_TICK,
            user_agent: default_user_agent(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: default_log_level(),
        }
    }

    /// Load configuration from the config file if present, then apply
    /// environment overrides. The result is validated.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::new("", "")
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from `RLVT_*` environment variables.
    pub fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored, as are numbers that fail to parse.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(company_id) = get("RLVT_COMPANY_ID") {
            self.company_id = company_id;
        }
        if let Some(datasource_id) = get("RLVT_DATASOURCE_ID") {
            self.datasource_id = datasource_id;
        }
        if let Some(host) = get("RLVT_COLLECTOR_HOST") {
            self.collector_host = host;
        }
        if let Some(endpoint) = get("RLVT_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(interval) = get("RLVT_RETRY_INTERVAL_SECS").and_then(|raw| raw.parse().ok()) {
            self.retry_interval_secs = interval;
        }
        if let Some(log_level) = get("RLVT_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Check the invariants a tracker relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.company_id.trim().is_empty() {
            return Err(ConfigError::Invalid("company_id must not be empty".into()));
        }
        if self.datasource_id.trim().is_empty() {
            return Err(ConfigError::Invalid("datasource_id must not be empty".into()));
        }
        if self.retry_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "retry_interval_secs must be greater than zero".into(),
            ));
        }
        if self.retries_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "retries_per_tick must be greater than zero".into(),
            ));
        }

        let endpoint = self.endpoint_url()?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint scheme must be http or https, got {}",
                endpoint.scheme()
            )));
        }

        Ok(())
    }

    /// Collector endpoint: the override, or
    /// `https://collector.<host>/collect/<datasource_id>/rlvt`.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://collector.{}/collect/{}/rlvt",
                self.collector_host.trim_end_matches('/'),
                self.datasource_id
            ),
        }
    }

    /// Get the endpoint as a parsed URL.
    pub fn endpoint_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.endpoint()).map_err(ConfigError::from)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    pub fn max_event_age(&self) -> Duration {
        Duration::from_secs(self.max_event_age_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
