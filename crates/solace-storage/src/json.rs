//! JSON record helpers over any [`ObjectStore`].

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::store::ObjectStore;

const JSON: &str = "application/json";

/// Load and deserialize a JSON record.
pub async fn load<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<T, StorageError> {
    let output = store.get(key).await?;
    Ok(serde_json::from_slice(&output.body)?)
}

/// Like [`load`], but a missing key yields `Ok(None)`.
pub async fn load_opt<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match load(store, key).await {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Serialize and store a JSON record. Returns the new ETag.
pub async fn save<T: Serialize>(
    store: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(value)?;
    store.put(key, body, Some(JSON)).await
}

/// Load every `.json` record under a prefix.
///
/// Records that fail to parse are skipped with a warning so one corrupt
/// object cannot take down a listing.
pub async fn load_all<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let keys = store.list(prefix).await?;

    let mut records = Vec::with_capacity(keys.len());
    for key in keys.iter().filter(|k| k.ends_with(".json")) {
        let output = match store.get(key).await {
            Ok(output) => output,
            Err(StorageError::NotFound { .. }) => continue,
            Err(e) => return Err(e),
        };
        match serde_json::from_slice(&output.body) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable record"),
        }
    }

    Ok(records)
}
