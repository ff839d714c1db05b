use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::store::{GetObjectOutput, ObjectStore};

struct StoredObject {
    body: Vec<u8>,
    content_type: Option<String>,
    version: u64,
}

/// Process-local [`ObjectStore`]. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, StoredObject>>, StorageError> {
        self.objects
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        let objects = self.lock()?;
        let object = objects.get(key).ok_or_else(|| StorageError::NotFound {
            key: key.to_string(),
        })?;
        Ok(GetObjectOutput {
            body: object.body.clone(),
            etag: Some(format!("\"{}\"", object.version)),
            content_type: object.content_type.clone(),
        })
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let mut objects = self.lock()?;
        let version = objects.get(key).map_or(1, |o| o.version + 1);
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.map(str::to_string),
                version,
            },
        );
        Ok(format!("\"{version}\""))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let objects = self.lock()?;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
