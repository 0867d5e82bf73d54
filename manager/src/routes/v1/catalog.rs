use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
    catalog::{Category, Subcategory, UPLOADABLE_EXTENSIONS},
    console::BucketConsole,
    types::Environment,
};

#[derive(Debug, Serialize, JsonSchema)]
pub struct CatalogResponse {
    /// Categories, in display order
    categories: Vec<Category>,
    /// Subcategories, in display order
    subcategories: Vec<Subcategory>,
    /// File extensions accepted for upload
    uploadable_extensions: Vec<String>,
    /// Bucket preselected in the console
    default_bucket: Option<String>,
    /// Largest accepted upload request in bytes
    max_upload_size_bytes: usize,
}

/// Options the console page renders its selectors from
#[allow(clippy::unused_async)]
pub async fn get_catalog(
    Extension(console): Extension<Arc<BucketConsole>>,
    Extension(environment): Extension<Environment>,
) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        categories: Category::iter().collect(),
        subcategories: Subcategory::iter().collect(),
        uploadable_extensions: UPLOADABLE_EXTENSIONS
            .iter()
            .map(ToString::to_string)
            .collect(),
        default_bucket: console.default_bucket().map(ToString::to_string),
        max_upload_size_bytes: environment.max_upload_size_bytes(),
    })
}
