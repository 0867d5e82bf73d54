//! S3 object operations used by the console

mod error;
#[cfg(feature = "test-utils")]
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub use error::{ObjectStorageError, ObjectStorageResult};
#[cfg(feature = "test-utils")]
pub use memory::{InMemoryObjectStore, StorageCall};

use crate::encode_key_path;

/// Listing entry for a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key within the bucket
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// Last modification time, when reported by the store
    pub last_modified: Option<DateTime<Utc>>,
}

/// Body and stored content type of an object
#[derive(Debug, Clone)]
pub struct ObjectContent {
    /// Content type recorded at upload time
    pub content_type: Option<String>,
    /// Object body, or the requested slice of it
    pub body: Bytes,
    /// `Content-Range` of a partial read, e.g. `bytes 0-1023/52428800`
    pub content_range: Option<String>,
}

/// Operations the console performs against the object store.
///
/// Each method maps to a single storage API call (paginated listings aside).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists the names of every bucket visible to the configured credentials
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<String>>;

    /// Lists every object in `bucket` whose key starts with `prefix`
    async fn list_objects(&self, bucket: &str, prefix: &str)
        -> ObjectStorageResult<Vec<ObjectSummary>>;

    /// Returns whether `key` exists in `bucket`
    async fn object_exists(&self, bucket: &str, key: &str) -> ObjectStorageResult<bool>;

    /// Downloads an object, or the part of it selected by an HTTP `Range`
    /// header value such as `bytes=0-1023`
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&str>,
    ) -> ObjectStorageResult<ObjectContent>;

    /// Uploads an object, replacing any object stored under the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStorageResult<()>;

    /// Copies `source_key` to `destination_key` within `bucket`
    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> ObjectStorageResult<()>;

    /// Deletes an object. Deleting a missing key succeeds.
    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()>;
}

/// Object store backed by Amazon S3
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStore {
    /// Creates a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

fn to_chrono(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<String>> {
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let output = self
                .s3_client
                .list_buckets()
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|e| ObjectStorageError::from_sdk("*", e))?;

            names.extend(
                output
                    .buckets()
                    .iter()
                    .filter_map(|bucket| bucket.name().map(ToString::to_string)),
            );

            match output.continuation_token() {
                Some(token) if !token.is_empty() => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = names.len(), "Listed buckets");
        Ok(names)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> ObjectStorageResult<Vec<ObjectSummary>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ObjectStorageError::from_sdk(bucket, e))?;
            objects.extend(page.contents().iter().filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size().unwrap_or_default(),
                    last_modified: object.last_modified().and_then(to_chrono),
                })
            }));
        }

        debug!(bucket, prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> ObjectStorageResult<bool> {
        let result = self
            .s3_client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match ObjectStorageError::from_sdk(&format!("{bucket}/{key}"), e) {
                ObjectStorageError::ObjectNotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&str>,
    ) -> ObjectStorageResult<ObjectContent> {
        let output = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_range(range.map(ToString::to_string))
            .send()
            .await
            .map_err(|e| ObjectStorageError::from_sdk(&format!("{bucket}/{key}"), e))?;

        let content_type = output.content_type().map(ToString::to_string);
        let content_range = output.content_range().map(ToString::to_string);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStorageError::BodyError(e.to_string()))?
            .into_bytes();

        debug!(bucket, key, range, size_bytes = body.len(), "Fetched object");
        Ok(ObjectContent {
            content_type,
            body,
            content_range,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStorageResult<()> {
        let size = body.len();

        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket, key, size_bytes = size, error = %e, "S3 upload failed");
                ObjectStorageError::from_sdk(&format!("{bucket}/{key}"), e)
            })?;

        info!(bucket, key, size_bytes = size, content_type, "Object uploaded");
        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> ObjectStorageResult<()> {
        self.s3_client
            .copy_object()
            .bucket(bucket)
            .copy_source(format!("{bucket}/{}", encode_key_path(source_key)))
            .key(destination_key)
            .send()
            .await
            .map_err(|e| ObjectStorageError::from_sdk(&format!("{bucket}/{source_key}"), e))?;

        info!(bucket, source_key, destination_key, "Object copied");
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStorageError::from_sdk(&format!("{bucket}/{key}"), e))?;

        info!(bucket, key, "Object deleted");
        Ok(())
    }
}
