//! Bucket console operations
//!
//! One method per user action. Each action validates its input, then issues
//! the matching storage call and returns what the page needs to render.

mod error;

use std::sync::Arc;

use bucket_storage::{Distribution, DistributionDirectory, ObjectStore};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub use error::{ConsoleError, ConsoleResult};

use crate::catalog::{
    cdn_url, guess_content_type, is_uploadable, listing_prefix, rename_target,
    sanitize_file_name, upload_key, Category, MediaKind, Subcategory,
};

/// S3 rejects keys longer than this many bytes
const MAX_KEY_BYTES: usize = 1024;

/// Content types S3 records when the uploader did not set one
const GENERIC_CONTENT_TYPES: [&str; 2] = ["application/octet-stream", "binary/octet-stream"];

/// A listed object with everything the grid shows for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectView {
    /// Object key
    pub key: String,
    /// Preview kind derived from the extension
    pub kind: MediaKind,
    /// Size in bytes
    pub size: i64,
    /// Last modification time
    pub last_modified: Option<DateTime<Utc>>,
    /// CDN URL, also used as download link
    pub cdn_url: String,
}

/// Result of browsing a bucket
#[derive(Debug, Clone)]
pub struct Listing {
    /// Bucket listed
    pub bucket: String,
    /// Key prefix the listing was filtered by
    pub prefix: String,
    /// Objects under the prefix
    pub objects: Vec<ObjectView>,
}

/// Object body ready to be served for previews
#[derive(Debug, Clone)]
pub struct FetchedObject {
    /// Content type to serve the body with
    pub content_type: String,
    /// Object body, or the requested part of it
    pub body: Bytes,
    /// `Content-Range` when only part of the object was read
    pub content_range: Option<String>,
}

/// Outcome of a rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    /// Key before the rename
    pub previous_key: String,
    /// Key after the rename
    pub key: String,
    /// CDN URL of the renamed object
    pub cdn_url: String,
}

/// A file submitted through the upload form
#[derive(Debug, Clone)]
pub struct NewUpload {
    /// File name as sent by the browser
    pub file_name: String,
    /// Content type as sent by the browser
    pub content_type: Option<String>,
    /// File content
    pub body: Bytes,
    /// Destination category
    pub category: Category,
    /// Destination subcategory
    pub subcategory: Subcategory,
    /// Name to store the file under; defaults to the sanitized file name
    pub item_name: Option<String>,
}

/// Outcome of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// Key the file was stored under
    pub key: String,
    /// CDN URL of the uploaded object
    pub cdn_url: String,
    /// Content type recorded with the object
    pub content_type: String,
    /// Size in bytes
    pub size: usize,
}

/// Administrative console over the CDN buckets
pub struct BucketConsole {
    object_store: Arc<dyn ObjectStore>,
    distributions: Arc<dyn DistributionDirectory>,
    bucket_keywords: Vec<String>,
    default_bucket: Option<String>,
}

impl BucketConsole {
    /// Creates a new console
    ///
    /// # Arguments
    ///
    /// * `object_store` - Store holding the media
    /// * `distributions` - Directory of the CDN distributions
    /// * `bucket_keywords` - Lowercase keywords a managed bucket name contains;
    ///   an empty list manages every bucket
    /// * `default_bucket` - Bucket preselected in the UI, always managed
    #[must_use]
    pub const fn new(
        object_store: Arc<dyn ObjectStore>,
        distributions: Arc<dyn DistributionDirectory>,
        bucket_keywords: Vec<String>,
        default_bucket: Option<String>,
    ) -> Self {
        Self {
            object_store,
            distributions,
            bucket_keywords,
            default_bucket,
        }
    }

    /// Bucket preselected in the UI
    #[must_use]
    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref()
    }

    /// Whether the console may operate on `bucket`
    #[must_use]
    pub fn is_managed_bucket(&self, bucket: &str) -> bool {
        if bucket.is_empty() {
            return false;
        }
        if self.default_bucket.as_deref() == Some(bucket) {
            return true;
        }
        let name = bucket.to_ascii_lowercase();
        self.bucket_keywords.is_empty()
            || self
                .bucket_keywords
                .iter()
                .any(|keyword| name.contains(keyword.as_str()))
    }

    fn ensure_managed(&self, bucket: &str) -> ConsoleResult<()> {
        if self.is_managed_bucket(bucket) {
            Ok(())
        } else {
            Err(ConsoleError::UnmanagedBucket(bucket.to_string()))
        }
    }

    /// Lists the buckets the console manages
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::Storage` if the bucket listing fails
    pub async fn managed_buckets(&self) -> ConsoleResult<Vec<String>> {
        let buckets = self.object_store.list_buckets().await?;
        let total = buckets.len();
        let managed: Vec<String> = buckets
            .into_iter()
            .filter(|bucket| self.is_managed_bucket(bucket))
            .collect();

        debug!(total, managed = managed.len(), "Filtered buckets");
        Ok(managed)
    }

    /// Lists the objects of `bucket`, filtered by category and subcategory
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::UnmanagedBucket` for buckets outside the console,
    /// `ConsoleError::Storage` if the listing fails
    pub async fn browse(
        &self,
        bucket: &str,
        category: Option<Category>,
        subcategory: Option<Subcategory>,
    ) -> ConsoleResult<Listing> {
        self.ensure_managed(bucket)?;

        let prefix = listing_prefix(category, subcategory);
        let objects = self
            .object_store
            .list_objects(bucket, &prefix)
            .await?
            .into_iter()
            .map(|object| ObjectView {
                kind: MediaKind::from_key(&object.key),
                cdn_url: cdn_url(bucket, &object.key),
                key: object.key,
                size: object.size,
                last_modified: object.last_modified,
            })
            .collect();

        Ok(Listing {
            bucket: bucket.to_string(),
            prefix,
            objects,
        })
    }

    /// Downloads an object for preview
    ///
    /// The stored content type is used unless it is missing or generic, in which
    /// case it is guessed from the key.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::UnmanagedBucket`, `ConsoleError::InvalidKey`, or
    /// `ConsoleError::Storage` (e.g. object not found)
    pub async fn fetch(
        &self,
        bucket: &str,
        key: &str,
        range: Option<&str>,
    ) -> ConsoleResult<FetchedObject> {
        self.ensure_managed(bucket)?;
        validate_key(key)?;

        let content = self.object_store.get_object(bucket, key, range).await?;
        let content_type = content
            .content_type
            .filter(|ct| !ct.is_empty() && !GENERIC_CONTENT_TYPES.contains(&ct.as_str()))
            .unwrap_or_else(|| guess_content_type(key).to_string());

        Ok(FetchedObject {
            content_type,
            body: content.body,
            content_range: content.content_range,
        })
    }

    /// Deletes an object
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::UnmanagedBucket`, `ConsoleError::InvalidKey`, or
    /// `ConsoleError::Storage` if the deletion fails
    pub async fn delete(&self, bucket: &str, key: &str) -> ConsoleResult<()> {
        self.ensure_managed(bucket)?;
        validate_key(key)?;

        self.object_store.delete_object(bucket, key).await?;

        info!(bucket, key, "Deleted object");
        Ok(())
    }

    /// Renames an object by copying it to its new key and deleting the original.
    ///
    /// The object keeps its folder and extension; see
    /// [`rename_target`](crate::catalog::rename_target).
    ///
    /// # Errors
    ///
    /// - `ConsoleError::UnmanagedBucket` for buckets outside the console
    /// - `ConsoleError::InvalidKey` / `ConsoleError::InvalidName` for bad input
    /// - `ConsoleError::SameKey` if the new key equals the current one
    /// - `ConsoleError::ObjectExists` if the new key is taken
    /// - `ConsoleError::Storage` if any storage call fails
    pub async fn rename(&self, bucket: &str, key: &str, new_name: &str) -> ConsoleResult<Renamed> {
        self.ensure_managed(bucket)?;
        validate_key(key)?;
        let new_name = new_name.trim();
        validate_name(new_name)?;

        let target = rename_target(key, new_name);
        validate_key(&target)?;
        if target == key {
            return Err(ConsoleError::SameKey(target));
        }

        if self.object_store.object_exists(bucket, &target).await? {
            return Err(ConsoleError::ObjectExists(target));
        }

        self.object_store.copy_object(bucket, key, &target).await?;
        self.object_store.delete_object(bucket, key).await?;

        info!(bucket, from = key, to = %target, "Renamed object");
        Ok(Renamed {
            previous_key: key.to_string(),
            cdn_url: cdn_url(bucket, &target),
            key: target,
        })
    }

    /// Stores an uploaded file under `category/subcategory/item_name`
    ///
    /// # Errors
    ///
    /// - `ConsoleError::UnmanagedBucket` for buckets outside the console
    /// - `ConsoleError::UnsupportedFileType` for extensions outside the accepted set
    /// - `ConsoleError::EmptyUpload` for empty files
    /// - `ConsoleError::InvalidName` for an invalid item name
    /// - `ConsoleError::Storage` if the upload fails
    pub async fn upload(&self, bucket: &str, upload: NewUpload) -> ConsoleResult<Uploaded> {
        self.ensure_managed(bucket)?;

        if !is_uploadable(&upload.file_name) {
            return Err(ConsoleError::UnsupportedFileType(upload.file_name));
        }
        if upload.body.is_empty() {
            return Err(ConsoleError::EmptyUpload(upload.file_name));
        }

        let item_name = upload
            .item_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| sanitize_file_name(&upload.file_name), ToString::to_string);
        validate_name(&item_name)?;

        let key = upload_key(upload.category, upload.subcategory, &item_name);
        validate_key(&key)?;

        let content_type = resolve_content_type(upload.content_type.as_deref(), &upload.file_name);
        let size = upload.body.len();

        self.object_store
            .put_object(bucket, &key, upload.body, &content_type)
            .await?;

        info!(bucket, key = %key, size_bytes = size, "Uploaded object");
        Ok(Uploaded {
            cdn_url: cdn_url(bucket, &key),
            key,
            content_type,
            size,
        })
    }

    /// Finds the CDN distribution served under `domain`
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::DistributionNotFound` if no distribution matches,
    /// `ConsoleError::Lookup` if the lookup fails
    pub async fn distribution_for(&self, domain: &str) -> ConsoleResult<Distribution> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ConsoleError::DistributionNotFound(domain.to_string()));
        }

        self.distributions
            .find_by_domain(domain)
            .await?
            .ok_or_else(|| ConsoleError::DistributionNotFound(domain.to_string()))
    }
}

fn validate_key(key: &str) -> ConsoleResult<()> {
    if key.is_empty() || key.len() > MAX_KEY_BYTES {
        return Err(ConsoleError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> ConsoleResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c: char| c == '/' || c == '\\')
        || name.chars().any(char::is_control);

    if invalid {
        return Err(ConsoleError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Content type sent by the browser when it is a valid, specific MIME type,
/// otherwise the one implied by the file extension
fn resolve_content_type(sent: Option<&str>, file_name: &str) -> String {
    sent.and_then(|raw| raw.parse::<mime::Mime>().ok())
        .filter(|parsed| *parsed != mime::APPLICATION_OCTET_STREAM)
        .map_or_else(|| guess_content_type(file_name).to_string(), |parsed| parsed.to_string())
}
