//! In-memory distribution directory for tests

use async_trait::async_trait;

use super::{Distribution, DistributionDirectory, DistributionResult};

/// Fixed list of distributions searched in order
#[derive(Debug, Default, Clone)]
pub struct InMemoryDistributionDirectory {
    distributions: Vec<Distribution>,
}

impl InMemoryDistributionDirectory {
    /// Creates a directory holding `distributions`
    #[must_use]
    pub const fn new(distributions: Vec<Distribution>) -> Self {
        Self { distributions }
    }
}

#[async_trait]
impl DistributionDirectory for InMemoryDistributionDirectory {
    async fn find_by_domain(&self, domain: &str) -> DistributionResult<Option<Distribution>> {
        Ok(self
            .distributions
            .iter()
            .find(|distribution| distribution.serves(domain))
            .cloned())
    }
}
