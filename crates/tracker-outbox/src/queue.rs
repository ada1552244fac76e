//! Persisted retry queue.

use crate::OutboxResult;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};
use tracker_storage::{DurableStore, StorageKeys};

/// FIFO of encoded events awaiting redelivery.
///
/// The whole queue lives in the durable store as one JSON array under
/// [`StorageKeys::RETRY_QUEUE`]. Every operation is a read-modify-write of
/// that value, serialized through a per-queue mutex so a push racing a pop
/// cannot lose entries.
pub struct RetryQueue {
    store: Arc<dyn DurableStore>,
    lock: Mutex<()>,
}

impl RetryQueue {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Append an encoded event to the tail.
    pub async fn push(&self, entry: String) -> OutboxResult<usize> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load()?;
        entries.push(entry);
        self.save(&entries)?;

        debug!(queue_len = entries.len(), "Queued event for retry");
        Ok(entries.len())
    }

    /// Remove and return the oldest entry.
    ///
    /// The shortened queue is persisted before returning, so the entry is
    /// gone from storage even if the caller never resends it.
    pub async fn pop_front(&self) -> OutboxResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load()?;
        if entries.is_empty() {
            return Ok(None);
        }

        let entry = entries.remove(0);
        self.save(&entries)?;
        Ok(Some(entry))
    }

    /// Number of queued entries.
    pub async fn len(&self) -> OutboxResult<usize> {
        let _guard = self.lock.lock().await;
        Ok(self.load()?.len())
    }

    pub async fn is_empty(&self) -> OutboxResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Snapshot of all entries, oldest first.
    pub async fn entries(&self) -> OutboxResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        self.load()
    }

    /// Drop every queued entry.
    pub async fn clear(&self) -> OutboxResult<()> {
        let _guard = self.lock.lock().await;
        self.store.remove(StorageKeys::RETRY_QUEUE)?;
        Ok(())
    }

    fn load(&self) -> OutboxResult<Vec<String>> {
        let Some(raw) = self.store.get(StorageKeys::RETRY_QUEUE)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // The next save overwrites the corrupt value.
                error!(error = %e, "Retry queue is corrupt, discarding it");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[String]) -> OutboxResult<()> {
        if entries.is_empty() {
            self.store.remove(StorageKeys::RETRY_QUEUE)?;
        } else {
            let raw = serde_json::to_string(entries)
                .map_err(tracker_storage::StorageError::from)?;
            self.store.set(StorageKeys::RETRY_QUEUE, &raw)?;
        }
        Ok(())
    }
}
