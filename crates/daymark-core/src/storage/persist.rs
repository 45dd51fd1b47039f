//! JSON (de)serialization of store lists over a [`KvStore`].
//!
//! Loading never fails: a missing key yields the seed, and a corrupt value or
//! backend error is logged and replaced by the seed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::KvStore;
use crate::error::StorageError;

pub fn load_or_seed<T, S, F>(store: &S, key: &str, seed: F) -> T
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
    F: FnOnce() -> T,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value is corrupt, using seed data");
                seed()
            }
        },
        Ok(None) => {
            debug!(key, "no stored value, using seed data");
            seed()
        }
        Err(e) => {
            warn!(key, error = %e, "failed to read stored value, using seed data");
            seed()
        }
    }
}

/// # Errors
/// The value cannot be encoded.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}

/// # Errors
/// Encoding or backend failure.
pub fn save<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let raw = encode(key, value)?;
    store.set(key, &raw)?;
    info!(key, bytes = raw.len(), "saved");
    Ok(())
}
