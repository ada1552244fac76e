//! Durable key-value storage and device identity for the tracker.
//!
//! This crate provides:
//! - **DurableStore**: the synchronous get/set/remove capability the tracker
//!   persists its identity and retry queue through
//! - **MemoryStore**: process-local store for tests and ephemeral hosts
//! - **FileStore**: a single JSON file rewritten atomically on every change
//! - **DeviceIdProvider**: best-effort stable device identifiers

mod device;
mod file;
mod keys;
mod memory;
mod traits;

pub use device::{DeviceIdProvider, NoDeviceId, PlatformDeviceId, StaticDeviceId};
pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use traits::DurableStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
