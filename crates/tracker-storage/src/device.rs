//! Device identity providers.
//!
//! A provider returns a platform-stable identifier when one is available.
//! The tracker falls back to a random id when it is not.

use std::path::PathBuf;
use tracing::debug;

/// Source of a best-effort stable device identifier.
pub trait DeviceIdProvider: Send + Sync {
    /// Return the device id, or `None` when the platform cannot provide one.
    fn device_id(&self) -> Option<String>;
}

/// Reads the OS machine id.
///
/// On Linux this is `/etc/machine-id`, falling back to the D-Bus copy.
/// Other platforms report no id.
#[derive(Debug, Clone)]
pub struct PlatformDeviceId {
    candidates: Vec<PathBuf>,
}

impl PlatformDeviceId {
    pub fn new() -> Self {
        let candidates = if cfg!(target_os = "linux") {
            vec![
                PathBuf::from("/etc/machine-id"),
                PathBuf::from("/var/lib/dbus/machine-id"),
            ]
        } else {
            Vec::new()
        };
        Self { candidates }
    }

    /// Read the id from explicit files, in order.
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }
}

impl Default for PlatformDeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceIdProvider for PlatformDeviceId {
    fn device_id(&self) -> Option<String> {
        for path in &self.candidates {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let id = content.trim();
                    if !id.is_empty() {
                        return Some(id.to_string());
                    }
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Machine id unavailable");
                }
            }
        }
        None
    }
}

/// Always returns the same id. Empty ids count as unavailable.
#[derive(Debug, Clone)]
pub struct StaticDeviceId(String);

impl StaticDeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl DeviceIdProvider for StaticDeviceId {
    fn device_id(&self) -> Option<String> {
        let id = self.0.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
}

/// Never provides an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceId;

impl DeviceIdProvider for NoDeviceId {
    fn device_id(&self) -> Option<String> {
        None
    }
}
