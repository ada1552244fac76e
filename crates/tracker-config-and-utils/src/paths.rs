//! File system paths for the tracker.

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Manages file system paths used by the tracker binary.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for tracker files (~/.rlvt)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.rlvt`.
    pub fn new() -> ConfigResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ConfigError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".rlvt"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.rlvt).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.rlvt/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the durable store file path (~/.rlvt/store.json).
    pub fn store_file(&self) -> PathBuf {
        self.base_dir.join("store.json")
    }

    /// Get the logs directory (~/.rlvt/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the log file path (~/.rlvt/logs/tracker.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("tracker.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_with_custom_base_dir() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), &dir.path().to_path_buf());
        assert_eq!(paths.config_file(), dir.path().join("config.json"));
        assert_eq!(paths.store_file(), dir.path().join("store.json"));
        assert_eq!(
            paths.log_file(),
            dir.path().join("logs").join("tracker.jsonl")
        );
    }

    #[test]
    fn test_paths_ensure_dirs() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested"));

        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }
}
