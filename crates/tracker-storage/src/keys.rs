//! Storage key constants.

/// Storage keys used by the tracker
pub struct StorageKeys;

impl StorageKeys {
    /// Device-scoped temporary id
    pub const TMP_ID: &'static str = "rlvt_tmp_id";

    /// Identified user id
    pub const USER_ID: &'static str = "rlvt_user_id";

    /// Retry queue (JSON array of encoded events)
    pub const RETRY_QUEUE: &'static str = "rlvt_retry_queue";

    /// All keys owned by the tracker.
    pub const ALL: [&'static str; 3] = [Self::TMP_ID, Self::USER_ID, Self::RETRY_QUEUE];
}
