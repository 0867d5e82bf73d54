use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    catalog::{Category, MediaKind, Subcategory},
    console::{BucketConsole, ObjectView},
    types::{AppError, ValidatedJson},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BrowseQuery {
    /// Category to list; all categories when omitted
    pub category: Option<Category>,
    /// Subcategory to list; ignored without a category
    pub subcategory: Option<Subcategory>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct KeyQuery {
    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ObjectResponse {
    /// Object key
    pub key: String,
    /// Last segment of the key
    pub name: String,
    /// How the console previews the object
    pub kind: MediaKind,
    /// Size in bytes
    pub size: i64,
    /// ISO-8601 UTC timestamp of the last modification
    pub last_modified: Option<String>,
    /// URL the CDN serves the object under
    pub cdn_url: String,
    /// Download link (served by the CDN)
    pub download_url: String,
    /// Console URL returning the object bytes, used for previews
    pub content_url: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListObjectsResponse {
    /// Bucket listed
    pub bucket: String,
    /// Key prefix the listing was filtered by
    pub prefix: String,
    /// Number of objects listed
    pub count: usize,
    /// Objects under the prefix
    pub objects: Vec<ObjectResponse>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DeleteResponse {
    /// Deleted key
    pub key: String,
    /// Confirmation shown by the console
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct RenameRequest {
    /// Current object key
    #[validate(length(min = 1, max = 1024, message = "must be 1 to 1024 characters"))]
    pub key: String,
    /// New name, without folder or extension
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub new_name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct RenameResponse {
    /// Key before the rename
    pub previous_key: String,
    /// Key after the rename
    pub key: String,
    /// CDN URL of the renamed object
    pub cdn_url: String,
    /// Confirmation shown by the console
    pub message: String,
}

fn content_url(bucket: &str, key: &str) -> String {
    format!(
        "/v1/buckets/{}/content?key={}",
        urlencoding::encode(bucket),
        urlencoding::encode(key)
    )
}

impl ObjectResponse {
    fn from_view(bucket: &str, view: ObjectView) -> Self {
        Self {
            name: view.key.rsplit('/').next().unwrap_or_default().to_string(),
            content_url: content_url(bucket, &view.key),
            download_url: view.cdn_url.clone(),
            last_modified: view.last_modified.map(|ts| ts.to_rfc3339()),
            key: view.key,
            kind: view.kind,
            size: view.size,
            cdn_url: view.cdn_url,
        }
    }
}

/// Lists the objects of a bucket, filtered by category and subcategory
///
/// Objects are returned in key order with their preview kind and CDN URLs.
#[instrument(skip(console))]
pub async fn list_objects(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(bucket): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ListObjectsResponse>, AppError> {
    let listing = console
        .browse(&bucket, query.category, query.subcategory)
        .await?;

    let objects: Vec<ObjectResponse> = listing
        .objects
        .into_iter()
        .map(|view| ObjectResponse::from_view(&listing.bucket, view))
        .collect();

    Ok(Json(ListObjectsResponse {
        count: objects.len(),
        bucket: listing.bucket,
        prefix: listing.prefix,
        objects,
    }))
}

/// Streams the bytes of an object with its content type, for previews
///
/// A single-range `Range` header is forwarded to storage and answered with
/// `206 Partial Content`, so browsers can seek within video previews.
#[instrument(skip(console, headers))]
pub async fn object_content(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(bucket): Path<String>,
    Query(query): Query<KeyQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let fetched = console.fetch(&bucket, &query.key, range).await?;

    let common = [
        (header::CONTENT_TYPE, fetched.content_type),
        (header::CACHE_CONTROL, "private, max-age=60".to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
    ];

    Ok(match fetched.content_range {
        Some(content_range) => (
            StatusCode::PARTIAL_CONTENT,
            common,
            [(header::CONTENT_RANGE, content_range)],
            fetched.body,
        )
            .into_response(),
        None => (common, fetched.body).into_response(),
    })
}

/// Deletes an object
#[instrument(skip(console))]
pub async fn delete_object(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(bucket): Path<String>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    console.delete(&bucket, &query.key).await?;

    Ok(Json(DeleteResponse {
        message: format!("Deleted {}!", query.key),
        key: query.key,
    }))
}

/// Renames an object, keeping its folder and extension
///
/// The object is copied to its new key and the original is deleted.
///
/// # Errors
///
/// - 400 for an invalid key or name
/// - 404 if the object does not exist
/// - 409 if the new key equals the current one or is already taken
#[instrument(skip(console, payload))]
pub async fn rename_object(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(bucket): Path<String>,
    ValidatedJson(payload): ValidatedJson<RenameRequest>,
) -> Result<Json<RenameResponse>, AppError> {
    let renamed = console
        .rename(&bucket, &payload.key, &payload.new_name)
        .await?;

    Ok(Json(RenameResponse {
        message: format!("Renamed {} to {}!", renamed.previous_key, renamed.key),
        previous_key: renamed.previous_key,
        key: renamed.key,
        cdn_url: renamed.cdn_url,
    }))
}
