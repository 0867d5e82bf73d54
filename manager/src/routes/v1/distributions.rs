use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::{console::BucketConsole, types::AppError};

#[derive(Debug, Serialize, JsonSchema)]
pub struct DistributionResponse {
    /// `CloudFront` distribution ID
    pub id: String,
    /// `CloudFront` domain name
    pub domain_name: String,
    /// Alternate domain names
    pub aliases: Vec<String>,
    /// Deployment status
    pub status: String,
    /// Whether the distribution accepts requests
    pub enabled: bool,
}

/// Looks up the CDN distribution served under a domain name or alias
///
/// # Errors
///
/// Returns 404 when no distribution serves the domain
#[instrument(skip(console))]
pub async fn get_distribution(
    Extension(console): Extension<Arc<BucketConsole>>,
    Path(domain): Path<String>,
) -> Result<Json<DistributionResponse>, AppError> {
    let distribution = console.distribution_for(&domain).await?;

    Ok(Json(DistributionResponse {
        id: distribution.id,
        domain_name: distribution.domain_name,
        aliases: distribution.aliases,
        status: distribution.status,
        enabled: distribution.enabled,
    }))
}
