//! `CloudFront` distribution lookups

mod error;
#[cfg(feature = "test-utils")]
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_cloudfront::{types::DistributionSummary, Client as CloudFrontClient};
use tracing::debug;

pub use error::{DistributionError, DistributionResult};
#[cfg(feature = "test-utils")]
pub use memory::InMemoryDistributionDirectory;

/// A `CloudFront` distribution as shown by the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Distribution ID
    pub id: String,
    /// `CloudFront` domain name, e.g. `d111111abcdef8.cloudfront.net`
    pub domain_name: String,
    /// Alternate domain names (CNAMEs)
    pub aliases: Vec<String>,
    /// Deployment status, e.g. `Deployed`
    pub status: String,
    /// Whether the distribution accepts requests
    pub enabled: bool,
}

impl Distribution {
    /// Whether this distribution is served under `domain`, either as its
    /// `CloudFront` domain name or as one of its aliases (case-insensitive)
    #[must_use]
    pub fn serves(&self, domain: &str) -> bool {
        let domain = domain.trim();
        self.domain_name.eq_ignore_ascii_case(domain)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(domain))
    }
}

impl From<&DistributionSummary> for Distribution {
    fn from(summary: &DistributionSummary) -> Self {
        Self {
            id: summary.id().to_string(),
            domain_name: summary.domain_name().to_string(),
            aliases: summary
                .aliases()
                .map(|aliases| aliases.items().to_vec())
                .unwrap_or_default(),
            status: summary.status().to_string(),
            enabled: summary.enabled(),
        }
    }
}

/// Directory of the CDN distributions fronting the buckets
#[async_trait]
pub trait DistributionDirectory: Send + Sync {
    /// Finds the distribution served under `domain`, if any
    async fn find_by_domain(&self, domain: &str) -> DistributionResult<Option<Distribution>>;
}

/// Distribution directory backed by the `CloudFront` API
pub struct CloudFrontDirectory {
    cloudfront_client: Arc<CloudFrontClient>,
}

impl CloudFrontDirectory {
    /// Creates a new directory over a pre-configured `CloudFront` client
    #[must_use]
    pub const fn new(cloudfront_client: Arc<CloudFrontClient>) -> Self {
        Self { cloudfront_client }
    }
}

#[async_trait]
impl DistributionDirectory for CloudFrontDirectory {
    async fn find_by_domain(&self, domain: &str) -> DistributionResult<Option<Distribution>> {
        let mut marker: Option<String> = None;
        let mut scanned = 0_usize;

        loop {
            let output = self
                .cloudfront_client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await?;

            let Some(list) = output.distribution_list() else {
                break;
            };

            for summary in list.items() {
                scanned += 1;
                let distribution = Distribution::from(summary);
                if distribution.serves(domain) {
                    debug!(domain, id = %distribution.id, "Distribution found");
                    return Ok(Some(distribution));
                }
            }

            match list.next_marker() {
                Some(next) if list.is_truncated() && !next.is_empty() => {
                    marker = Some(next.to_string());
                }
                _ => break,
            }
        }

        debug!(domain, scanned, "No distribution serves domain");
        Ok(None)
    }
}
