use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{console::BucketConsole, types::AppError};

#[derive(Debug, Serialize, JsonSchema)]
pub struct BucketsResponse {
    /// Buckets managed by the console
    pub buckets: Vec<String>,
    /// Bucket preselected in the console
    pub default_bucket: Option<String>,
}

/// Lists the buckets whose names match the managed-bucket keywords
#[instrument(skip(console))]
pub async fn list_buckets(
    Extension(console): Extension<Arc<BucketConsole>>,
) -> Result<Json<BucketsResponse>, AppError> {
    let buckets = console.managed_buckets().await?;

    Ok(Json(BucketsResponse {
        buckets,
        default_bucket: console.default_bucket().map(ToString::to_string),
    }))
}
