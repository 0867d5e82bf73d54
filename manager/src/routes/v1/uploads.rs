use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Multipart, Path},
    Extension, Json,
};
use bytes::Bytes;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    catalog::{Category, Subcategory},
    console::{BucketConsole, NewUpload},
    types::AppError,
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    /// Key the file was stored under
    pub key: String,
    /// URL the CDN serves the file under
    pub cdn_url: String,
    /// Content type recorded with the object
    pub content_type: String,
    /// Size in bytes
    pub size: usize,
    /// Confirmation shown by the console
    pub message: String,
}

struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    body: Bytes,
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid {field}: {value:?}")))
}

/// Uploads a file to `category/subcategory/item_name`
///
/// Multipart form fields:
/// - `file`: the file (jpg, jpeg, png, mp4, mkv or avi)
/// - `category`, `subcategory`: destination folders
/// - `item_name` (optional): name to store the file under, defaults to the
///   file name lowercased with spaces replaced by `-`
#[instrument(skip(console, multipart))]
pub async fn upload_object(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file = None;
    let mut category = None;
    let mut subcategory = None;
    let mut item_name = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let body = field.bytes().await?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    body,
                });
            }
            "category" => {
                category = Some(parse_field::<Category>("category", &field.text().await?)?);
            }
            "subcategory" => {
                subcategory = Some(parse_field::<Subcategory>(
                    "subcategory",
                    &field.text().await?,
                )?);
            }
            "item_name" => item_name = Some(field.text().await?),
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    let file = file.ok_or_else(|| AppError::validation("Missing form field: file"))?;
    let category = category.ok_or_else(|| AppError::validation("Missing form field: category"))?;
    let subcategory =
        subcategory.ok_or_else(|| AppError::validation("Missing form field: subcategory"))?;

    let uploaded = console
        .upload(
            &bucket,
            NewUpload {
                file_name: file.file_name,
                content_type: file.content_type,
                body: file.body,
                category,
                subcategory,
                item_name,
            },
        )
        .await?;

    Ok(Json(UploadResponse {
        message: format!("File uploaded successfully to {}!", uploaded.key),
        key: uploaded.key,
        cdn_url: uploaded.cdn_url,
        content_type: uploaded.content_type,
        size: uploaded.size,
    }))
}
