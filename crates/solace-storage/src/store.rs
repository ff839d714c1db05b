use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;

/// Result of a GET operation, including the body and ETag.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: Option<String>,
    pub content_type: Option<String>,
}

/// Key/value object storage.
///
/// Keys are `/`-separated paths; see `solace_core::keys` for the layout.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. Missing keys yield [`StorageError::NotFound`].
    async fn get(&self, key: &str) -> Result<GetObjectOutput, StorageError>;

    /// Write an object, replacing any existing value. Returns the new ETag.
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List keys under a prefix, in lexicographic order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

pub type SharedStore = Arc<dyn ObjectStore>;
