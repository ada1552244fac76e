//! Device and user identity.

use crate::OutboxResult;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use tracker_events::random_id;
use tracker_storage::{DeviceIdProvider, DurableStore, StorageKeys};

/// Persisted `tmpId` / `userId` pair.
///
/// Both values are read through the durable store on every access, so they
/// survive restarts and disappear together with the store contents. Compound
/// operations (generate-if-absent, compare-and-set) hold a per-instance lock.
pub struct IdentityState {
    store: Arc<dyn DurableStore>,
    device_ids: Arc<dyn DeviceIdProvider>,
    lock: Mutex<()>,
}

impl IdentityState {
    pub fn new(store: Arc<dyn DurableStore>, device_ids: Arc<dyn DeviceIdProvider>) -> Self {
        Self {
            store,
            device_ids,
            lock: Mutex::new(()),
        }
    }

    /// Return the stored `tmpId`, generating and persisting one if absent.
    ///
    /// The platform device id is preferred; a random id is the fallback. A
    /// store failure is logged and the generated id is still returned, so
    /// events keep flowing with a best-effort id.
    pub fn ensure_tmp_id(&self) -> String {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_tmp_id_locked()
    }

    fn ensure_tmp_id_locked(&self) -> String {
        match self.store.get(StorageKeys::TMP_ID) {
            Ok(Some(tmp_id)) if !tmp_id.is_empty() => return tmp_id,
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read tmpId, generating a new one"),
        }

        let (tmp_id, source) = match self.device_ids.device_id() {
            Some(device_id) => (device_id, "device"),
            None => (random_id(), "random"),
        };

        if let Err(e) = self.store.set(StorageKeys::TMP_ID, &tmp_id) {
            warn!(error = %e, "Failed to persist tmpId");
        }
        debug!(source, "Generated tmpId");
        tmp_id
    }

    /// Stored `tmpId`, without generating one.
    pub fn tmp_id(&self) -> Option<String> {
        self.read(StorageKeys::TMP_ID)
    }

    /// Identified user, if any.
    pub fn user_id(&self) -> Option<String> {
        self.read(StorageKeys::USER_ID)
    }

    /// Store `user_id` if it differs from the current one.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set_user(&self, user_id: &str) -> OutboxResult<bool> {
        Ok(self.set_user_then(user_id, |_, _| ())?.is_some())
    }

    /// Store `user_id` if it differs from the current one, then run
    /// `on_change` with the `tmpId` and the new user id before the lock is
    /// released.
    ///
    /// Returns `None` when the id was already stored. A concurrent change
    /// cannot slip in between the store write and `on_change`.
    pub fn set_user_then<T>(
        &self,
        user_id: &str,
        on_change: impl FnOnce(&str, &str) -> T,
    ) -> OutboxResult<Option<T>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.store.get(StorageKeys::USER_ID)?.as_deref() == Some(user_id) {
            return Ok(None);
        }

        self.store.set(StorageKeys::USER_ID, user_id)?;
        info!("Identified user changed");

        let tmp_id = self.ensure_tmp_id_locked();
        Ok(Some(on_change(&tmp_id, user_id)))
    }

    /// Remove both ids from the store.
    pub fn clear(&self) -> OutboxResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(StorageKeys::TMP_ID)?;
        self.store.remove(StorageKeys::USER_ID)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "Failed to read identity");
                None
            }
        }
    }
}
