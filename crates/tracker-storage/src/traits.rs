//! Storage trait definitions.

use crate::StorageResult;

/// Durable string key-value store.
///
/// Calls are synchronous from the caller's point of view. Implementations
/// serialize their own operations; compound read-modify-write sequences
/// must be guarded by the caller.
pub trait DurableStore: Send + Sync {
    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a value. Returns whether the key existed.
    fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
