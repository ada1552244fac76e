//! rlvt - send tracker events and inspect the local retry queue.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracker_config_and_utils::{init_logging, try_parse_level, Paths, TrackerConfig};

/// rlvt tracker command-line interface.
#[derive(Parser)]
#[command(name = "rlvt")]
#[command(about = "Send telemetry events to the rlvt collector")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Append logs to the tracker log file instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Base directory for config, store and logs. Defaults to ~/.rlvt
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Company id sent as the payload key
    #[arg(long, env = "RLVT_COMPANY_ID", global = true)]
    company_id: Option<String>,

    /// Datasource id used to build the collector endpoint
    #[arg(long, env = "RLVT_DATASOURCE_ID", global = true)]
    datasource_id: Option<String>,

    /// Full collector endpoint, overriding the derived one
    #[arg(long, env = "RLVT_ENDPOINT", global = true)]
    endpoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one event and wait for its first delivery attempt
    Send {
        kind: EventKind,

        /// Product, category or brand id (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Extra label as key=value (repeatable)
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,

        /// Order total, required for purchase
        #[arg(long)]
        amount: Option<f64>,

        /// Transaction id for purchase
        #[arg(long)]
        trans_id: Option<String>,

        /// Event name for custom events
        #[arg(long)]
        name: Option<String>,

        /// Page URL attached to the event
        #[arg(long)]
        url: Option<String>,
    },
    /// Identify the current user
    Identify { user_id: String },
    /// Run one retry tick now
    Retry,
    /// Show stored identity and pending retries
    Status,
    /// Remove stored identity and the retry queue
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EventKind {
    PageView,
    ProductPage,
    CategoryView,
    BrandView,
    ProductHover,
    AddCart,
    Purchase,
    Custom,
}

/// Parse a `key=value` label argument.
fn parse_label(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("label key must not be empty in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// File config, then `RLVT_*` environment, then command-line flags.
fn load_config(cli: &Cli, paths: &Paths) -> anyhow::Result<TrackerConfig> {
    let config_path = paths.config_file();
    let mut config = if config_path.exists() {
        TrackerConfig::load_from_file(&config_path)?
    } else {
        TrackerConfig::new("", "")
    };
    config.load_from_env();

    if let Some(company_id) = &cli.company_id {
        config.company_id = company_id.clone();
    }
    if let Some(datasource_id) = &cli.datasource_id {
        config.datasource_id = datasource_id.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.base_dir {
        Some(base) => Paths::with_base_dir(base.clone()),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = load_config(&cli, &paths)?;

    let requested = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let level = try_parse_level(requested);
    let log_file = cli.log_file.then(|| paths.log_file());
    init_logging(level.unwrap_or(tracing::Level::INFO).as_str(), log_file);
    if level.is_none() {
        warn!(requested, "Unknown log level, falling back to info");
    }

    commands::run(cli.command, config, &paths).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_label_splits_on_first_equals() {
        assert_eq!(
            parse_label("lang=en_US").unwrap(),
            ("lang".to_string(), "en_US".to_string())
        );
        assert_eq!(
            parse_label("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn parse_label_allows_empty_value() {
        assert_eq!(
            parse_label("note=").unwrap(),
            ("note".to_string(), String::new())
        );
    }

    #[test]
    fn parse_label_rejects_bad_input() {
        assert!(parse_label("no-separator").is_err());
        assert!(parse_label("=value").is_err());
    }

    #[test]
    fn cli_parses_send_with_repeated_flags() {
        let cli = Cli::try_parse_from([
            "rlvt",
            "--company-id",
            "acme",
            "send",
            "purchase",
            "--id",
            "p1",
            "--id",
            "p2",
            "--label",
            "lang=en_US",
            "--amount",
            "9.99",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                kind, ids, labels, amount, ..
            } => {
                assert_eq!(kind, EventKind::Purchase);
                assert_eq!(ids, vec!["p1", "p2"]);
                assert_eq!(labels, vec![("lang".to_string(), "en_US".to_string())]);
                assert_eq!(amount, Some(9.99));
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn flags_override_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());
        TrackerConfig::new("from-file", "ds-file").save(&paths).unwrap();

        let cli = Cli::try_parse_from([
            "rlvt",
            "--company-id",
            "from-flag",
            "--endpoint",
            "http://127.0.0.1:8080/collect",
            "status",
        ])
        .unwrap();
        let config = load_config(&cli, &paths).unwrap();

        assert_eq!(config.company_id, "from-flag");
        assert_eq!(config.datasource_id, "ds-file");
        assert_eq!(config.endpoint(), "http://127.0.0.1:8080/collect");
    }
}
