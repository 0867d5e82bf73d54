//! Error types for distribution lookups

use aws_sdk_cloudfront::error::{DisplayErrorContext, SdkError};
use aws_sdk_cloudfront::operation::list_distributions::ListDistributionsError;
use thiserror::Error;

/// Result type for distribution lookups
pub type DistributionResult<T> = Result<T, DistributionError>;

/// Errors that can occur while looking up `CloudFront` distributions
#[derive(Error, Debug)]
pub enum DistributionError {
    /// Upstream service error (5xx, timeouts, connection failures)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Any other `CloudFront` error
    #[error("CloudFront error: {0}")]
    CloudFrontError(String),
}

impl From<SdkError<ListDistributionsError>> for DistributionError {
    fn from(error: SdkError<ListDistributionsError>) -> Self {
        let message = DisplayErrorContext(&error).to_string();
        match &error {
            SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() >= 500 => {
                Self::UpstreamError(message)
            }
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                Self::UpstreamError(message)
            }
            _ => Self::CloudFrontError(message),
        }
    }
}
