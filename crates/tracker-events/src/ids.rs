//! Random identifiers.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated event ids and fallback device ids.
pub const RANDOM_ID_LEN: usize = 25;

/// Generate a random alphanumeric id of [`RANDOM_ID_LEN`] characters.
pub fn random_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_ID_LEN)
        .map(char::from)
        .collect()
}
