//! crates/hakeem_core/src/store/mod.rs
//!
//! Key layout of the persisted state and helpers for reading and writing typed values
//! through any `KeyValueStore`.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, warn};

use crate::ports::{KeyValueStore, PortError, PortResult};

pub mod memory;

pub use memory::MemoryStore;

pub const PREFERENCES_KEY: &str = "preferences";
pub const JOURNAL_KEY: &str = "journal";
pub const DAILY_PICK_KEY: &str = "dailyPick";

/// Reads and decodes the value under `key`.
///
/// A missing key, a storage failure and an undecodable value all yield `None`;
/// the latter two are logged so that corrupted state never aborts startup.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = match store.get(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            error!("Failed to read '{}' from storage: {:?}", key, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!("Stored '{}' is corrupted, falling back to default: {}", key, e);
            None
        }
    }
}

/// Encodes `value` and stores it under `key`, replacing whatever was there.
pub async fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let encoded = serde_json::to_value(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.put(key, encoded).await
}
