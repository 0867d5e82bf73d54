//! In-memory object store for tests

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{ObjectContent, ObjectStorageError, ObjectStorageResult, ObjectStore, ObjectSummary};

/// A storage call received by [`InMemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum StorageCall {
    ListBuckets,
    ListObjects {
        bucket: String,
        prefix: String,
    },
    ObjectExists {
        bucket: String,
        key: String,
    },
    GetObject {
        bucket: String,
        key: String,
        range: Option<String>,
    },
    PutObject {
        bucket: String,
        key: String,
        content_type: String,
    },
    CopyObject {
        bucket: String,
        source_key: String,
        destination_key: String,
    },
    DeleteObject {
        bucket: String,
        key: String,
    },
}

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
}

type Buckets = BTreeMap<String, BTreeMap<String, StoredObject>>;

/// Object store keeping buckets in memory and journaling every call
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    buckets: Mutex<Buckets>,
    calls: Mutex<Vec<StorageCall>>,
}

impl InMemoryObjectStore {
    /// Creates an empty store without buckets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty bucket
    #[must_use]
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock_buckets().entry(bucket.to_string()).or_default();
        self
    }

    /// Stores an object without journaling a call, creating the bucket if needed
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>, content_type: Option<&str>) {
        self.lock_buckets().entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: content_type.map(ToString::to_string),
                last_modified: Utc::now(),
            },
        );
    }

    /// Keys currently stored in `bucket`, in lexicographic order
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock_buckets()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Body and content type stored under `key`
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<(Bytes, Option<String>)> {
        self.lock_buckets()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| (object.body.clone(), object.content_type.clone()))
    }

    /// Calls received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets the journaled calls
    pub fn clear_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: StorageCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn lock_buckets(&self) -> std::sync::MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Inclusive byte bounds selected by a single-range `Range` header, as S3
/// resolves them.
///
/// Malformed and multi-range values select the whole object (`Ok(None)`).
/// Ranges starting past the end are unsatisfiable (`Err`).
fn byte_range(range: &str, len: usize) -> Result<Option<(usize, usize)>, ()> {
    let Some(spec) = range.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };
    if spec.contains(',') {
        return Ok(None);
    }
    let Some((first, last)) = spec.split_once('-') else {
        return Ok(None);
    };

    match (first.trim(), last.trim()) {
        ("", suffix) => {
            let Ok(suffix) = suffix.parse::<usize>() else {
                return Ok(None);
            };
            if suffix == 0 || len == 0 {
                return Err(());
            }
            Ok(Some((len.saturating_sub(suffix), len - 1)))
        }
        (first, last) => {
            let Ok(start) = first.parse::<usize>() else {
                return Ok(None);
            };
            let end = if last.is_empty() {
                usize::MAX
            } else {
                match last.parse::<usize>() {
                    Ok(end) if end >= start => end,
                    _ => return Ok(None),
                }
            };
            if start >= len {
                return Err(());
            }
            Ok(Some((start, end.min(len - 1))))
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_buckets(&self) -> ObjectStorageResult<Vec<String>> {
        self.record(StorageCall::ListBuckets);
        Ok(self.lock_buckets().keys().cloned().collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> ObjectStorageResult<Vec<ObjectSummary>> {
        self.record(StorageCall::ListObjects {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        });

        let buckets = self.lock_buckets();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?;

        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: i64::try_from(object.body.len()).unwrap_or(i64::MAX),
                last_modified: Some(object.last_modified),
            })
            .collect())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> ObjectStorageResult<bool> {
        self.record(StorageCall::ObjectExists {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });

        let buckets = self.lock_buckets();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?;
        Ok(objects.contains_key(key))
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&str>,
    ) -> ObjectStorageResult<ObjectContent> {
        self.record(StorageCall::GetObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            range: range.map(ToString::to_string),
        });

        let buckets = self.lock_buckets();
        let object = buckets
            .get(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?
            .get(key)
            .ok_or_else(|| ObjectStorageError::ObjectNotFound(format!("{bucket}/{key}")))?;

        let len = object.body.len();
        let selected = match range {
            Some(range) => byte_range(range, len)
                .map_err(|()| ObjectStorageError::InvalidRange(format!("{bucket}/{key}")))?,
            None => None,
        };

        Ok(match selected {
            Some((start, end)) => ObjectContent {
                content_type: object.content_type.clone(),
                body: object.body.slice(start..=end),
                content_range: Some(format!("bytes {start}-{end}/{len}")),
            },
            None => ObjectContent {
                content_type: object.content_type.clone(),
                body: object.body.clone(),
                content_range: None,
            },
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ObjectStorageResult<()> {
        self.record(StorageCall::PutObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
        });

        let mut buckets = self.lock_buckets();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: Some(content_type.to_string()),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> ObjectStorageResult<()> {
        self.record(StorageCall::CopyObject {
            bucket: bucket.to_string(),
            source_key: source_key.to_string(),
            destination_key: destination_key.to_string(),
        });

        let mut buckets = self.lock_buckets();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?;
        let mut copy = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| ObjectStorageError::ObjectNotFound(format!("{bucket}/{source_key}")))?;
        copy.last_modified = Utc::now();
        objects.insert(destination_key.to_string(), copy);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> ObjectStorageResult<()> {
        self.record(StorageCall::DeleteObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });

        let mut buckets = self.lock_buckets();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| ObjectStorageError::BucketNotFound(bucket.to_string()))?;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_objects_filters_by_prefix() {
        let store = InMemoryObjectStore::new();
        store.insert("cdn.example.com", "misc/photo/a.jpg", "a", None);
        store.insert("cdn.example.com", "misc/video/b.mp4", "bb", None);
        store.insert("cdn.example.com", "food/photo/c.png", "ccc", None);

        let objects = store
            .list_objects("cdn.example.com", "misc/")
            .await
            .expect("listing succeeds");

        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["misc/photo/a.jpg", "misc/video/b.mp4"]);
        assert_eq!(objects[1].size, 2);
    }

    #[tokio::test]
    async fn test_missing_bucket_and_object() {
        let store = InMemoryObjectStore::new().with_bucket("cdn.example.com");

        let err = store.list_objects("nope", "").await.unwrap_err();
        assert!(matches!(err, ObjectStorageError::BucketNotFound(_)));

        let err = store
            .get_object("cdn.example.com", "missing.jpg", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectStorageError::ObjectNotFound(_)));

        // Deleting a missing key is not an error, like S3
        store
            .delete_object("cdn.example.com", "missing.jpg")
            .await
            .expect("delete is idempotent");
    }

    #[tokio::test]
    async fn test_copy_keeps_content_type_and_journals_calls() {
        let store = InMemoryObjectStore::new();
        store.insert("cdn.example.com", "a.png", "png", Some("image/png"));

        store
            .copy_object("cdn.example.com", "a.png", "b.png")
            .await
            .expect("copy succeeds");

        let (body, content_type) = store.object("cdn.example.com", "b.png").expect("copied");
        assert_eq!(body, Bytes::from_static(b"png"));
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(
            store.calls(),
            vec![StorageCall::CopyObject {
                bucket: "cdn.example.com".to_string(),
                source_key: "a.png".to_string(),
                destination_key: "b.png".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_ranged_reads() {
        let store = InMemoryObjectStore::new();
        store.insert("cdn.example.com", "clip.mp4", "0123456789", Some("video/mp4"));

        let content = store
            .get_object("cdn.example.com", "clip.mp4", Some("bytes=2-5"))
            .await
            .expect("range read");
        assert_eq!(content.body, Bytes::from_static(b"2345"));
        assert_eq!(content.content_range.as_deref(), Some("bytes 2-5/10"));

        let content = store
            .get_object("cdn.example.com", "clip.mp4", Some("bytes=7-"))
            .await
            .expect("open-ended range");
        assert_eq!(content.body, Bytes::from_static(b"789"));
        assert_eq!(content.content_range.as_deref(), Some("bytes 7-9/10"));

        let content = store
            .get_object("cdn.example.com", "clip.mp4", Some("bytes=-3"))
            .await
            .expect("suffix range");
        assert_eq!(content.body, Bytes::from_static(b"789"));

        let content = store
            .get_object("cdn.example.com", "clip.mp4", Some("bytes=0-99"))
            .await
            .expect("range past the end is clamped");
        assert_eq!(content.content_range.as_deref(), Some("bytes 0-9/10"));

        let content = store
            .get_object("cdn.example.com", "clip.mp4", Some("items=0-1"))
            .await
            .expect("malformed range reads everything");
        assert_eq!(content.body.len(), 10);
        assert_eq!(content.content_range, None);

        let err = store
            .get_object("cdn.example.com", "clip.mp4", Some("bytes=10-"))
            .await
            .unwrap_err();
        assert!(matches!(err, ObjectStorageError::InvalidRange(_)));

        assert_eq!(
            store.calls()[0],
            StorageCall::GetObject {
                bucket: "cdn.example.com".to_string(),
                key: "clip.mp4".to_string(),
                range: Some("bytes=2-5".to_string()),
            }
        );
    }
}
