use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_smithy_types::byte_stream::ByteStream;
use tracing::debug;

use crate::error::StorageError;
use crate::store::{GetObjectOutput, ObjectStore};

/// [`ObjectStore`] over a single S3 bucket.
///
/// Everything the backend persists lives in this one bucket; the key layout
/// is owned by `solace_core::keys`.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// `"Code: message"` from an S3 service error, falling back to its display.
fn describe(err: &impl ProvideErrorMetadata, fallback: impl ToString) -> String {
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        _ => fallback.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<GetObjectOutput, StorageError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let err = e.into_service_error();
                return Err(if err.is_no_such_key() {
                    StorageError::NotFound {
                        key: key.to_string(),
                    }
                } else {
                    StorageError::GetObject(describe(&err, &err))
                });
            }
        };

        let etag = output.e_tag().map(str::to_string);
        let content_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::GetObject(format!("reading body of {key}: {e}")))?
            .into_bytes();

        debug!(bucket = %self.bucket, key, size = bytes.len(), "s3 get");
        Ok(GetObjectOutput {
            body: bytes.to_vec(),
            etag,
            content_type,
        })
    }

    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let size = body.len();
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                StorageError::PutObject(describe(&err, &err))
            })?;

        debug!(bucket = %self.bucket, key, size, "s3 put");
        Ok(output.e_tag().map(str::to_string).unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // S3 answers 204 for keys that never existed, which matches the trait.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                StorageError::DeleteObject(describe(&err, &err))
            })?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                let err = e.into_service_error();
                StorageError::ListObjects(describe(&err, &err))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );
        }

        // The trait promises lexicographic order.
        keys.sort_unstable();
        Ok(keys)
    }
}
