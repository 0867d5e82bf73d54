//! Error types for object storage operations

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type for object storage operations
pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

/// Errors that can occur while talking to the object store
#[derive(Error, Debug)]
pub enum ObjectStorageError {
    /// The bucket does not exist
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    /// The object does not exist
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// The requested byte range lies outside the object
    #[error("Requested range not satisfiable: {0}")]
    InvalidRange(String),

    /// Upstream service error (5xx from S3, timeouts, connection failures)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Any other S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// The object body could not be read
    #[error("Failed to read object body: {0}")]
    BodyError(String),
}

impl ObjectStorageError {
    /// Classifies an SDK error raised while operating on `target`.
    ///
    /// `target` is `bucket` or `bucket/key` and ends up in the error message.
    pub(crate) fn from_sdk<E>(target: &str, error: SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        match &error {
            SdkError::ServiceError(service_err) => {
                let status = service_err.raw().status().as_u16();
                match service_err.err().code() {
                    Some("NoSuchBucket") => Self::BucketNotFound(target.to_string()),
                    Some("NoSuchKey" | "NotFound") => Self::ObjectNotFound(target.to_string()),
                    Some("InvalidRange") => Self::InvalidRange(target.to_string()),
                    _ if status == 404 => Self::ObjectNotFound(target.to_string()),
                    _ if status == 416 => Self::InvalidRange(target.to_string()),
                    _ if status >= 500 => {
                        Self::UpstreamError(format!("{target}: {}", DisplayErrorContext(&error)))
                    }
                    _ => Self::S3Error(format!("{target}: {}", DisplayErrorContext(&error))),
                }
            }
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                Self::UpstreamError(format!("{target}: {}", DisplayErrorContext(&error)))
            }
            _ => Self::S3Error(format!("{target}: {}", DisplayErrorContext(&error))),
        }
    }
}
