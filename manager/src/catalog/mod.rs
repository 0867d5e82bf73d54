//! Key layout of the CDN buckets.
//!
//! Media is stored under `category/subcategory/name`. The console browses by
//! key prefix, derives upload and rename keys from that layout and builds the
//! CDN URLs objects are served under.

use bucket_storage::encode_key_path;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// File extensions accepted for upload
pub const UPLOADABLE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "mp4", "mkv", "avi"];

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mkv", "avi"];

/// Top-level folder of a media key
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Category {
    RaceEvents,
    Offroad,
    CarShows,
    Misc,
    Rallyx,
    Gfx,
    Food,
    Clients,
}

/// Second-level folder of a media key
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Subcategory {
    General,
    Other,
    Photo,
    Video,
}

/// How the console previews an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaKind {
    /// Rendered as a thumbnail
    Image,
    /// Rendered as a video player
    Video,
    /// Listed without preview
    Other,
}

impl MediaKind {
    /// Classifies a key by its extension, ignoring case
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match file_extension(key).map(str::to_ascii_lowercase) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Self::Image,
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Self::Video,
            _ => Self::Other,
        }
    }
}

/// Key prefix listing a category, optionally narrowed to a subcategory.
///
/// Without a category the whole bucket is listed and the subcategory is
/// ignored.
#[must_use]
pub fn listing_prefix(category: Option<Category>, subcategory: Option<Subcategory>) -> String {
    match (category, subcategory) {
        (None, _) => String::new(),
        (Some(category), None) => format!("{category}/"),
        (Some(category), Some(subcategory)) => format!("{category}/{subcategory}/"),
    }
}

/// Key an uploaded item is stored under
#[must_use]
pub fn upload_key(category: Category, subcategory: Subcategory, item_name: &str) -> String {
    format!("{category}/{subcategory}/{item_name}")
}

/// Extension of the last path segment of `key`, without the dot.
///
/// Dot files (`.env`) and names ending in a dot have no extension.
#[must_use]
pub fn file_extension(key: &str) -> Option<&str> {
    let file = key.rsplit('/').next().unwrap_or(key);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Key `key` is renamed to when given `new_name`.
///
/// The folder and the extension of `key` are kept: `a/b/old.jpg` renamed to
/// `new` becomes `a/b/new.jpg`. A `new_name` already carrying the extension is
/// not suffixed twice.
#[must_use]
pub fn rename_target(key: &str, new_name: &str) -> String {
    let (folder, file) = match key.rsplit_once('/') {
        Some((folder, file)) => (Some(folder), file),
        None => (None, key),
    };

    let renamed = match file_extension(file) {
        Some(ext)
            if !new_name
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", ext.to_ascii_lowercase())) =>
        {
            format!("{new_name}.{ext}")
        }
        _ => new_name.to_string(),
    };

    match folder {
        Some(folder) => format!("{folder}/{renamed}"),
        None => renamed,
    }
}

/// Default item name for an uploaded file: lowercase, spaces replaced by `-`.
///
/// Any client-side path is dropped.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name)
        .trim();
    base.to_lowercase().replace(' ', "-")
}

/// Whether `file_name` has an uploadable extension
#[must_use]
pub fn is_uploadable(file_name: &str) -> bool {
    file_extension(file_name)
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| UPLOADABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// URL the CDN serves `key` under. Buckets are named after their CDN domain.
#[must_use]
pub fn cdn_url(bucket: &str, key: &str) -> String {
    format!("https://{bucket}/{}", encode_key_path(key))
}

/// Content type implied by the extension of `key`
#[must_use]
pub fn guess_content_type(key: &str) -> &'static str {
    match file_extension(key).map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("mp4") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
