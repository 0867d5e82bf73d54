//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bucket_storage::{DistributionError, ObjectStorageError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::console::ConsoleError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message, shown as-is by the console
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
            },
        }
    }

    /// Bad request with the `validation_error` code
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", msg, false)
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert multipart parsing errors to application errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart error: {err}");
        let status = err.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(status, "payload_too_large", "Upload exceeds the size limit", false)
        } else {
            Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_multipart",
                err.body_text(),
                false,
            )
        }
    }
}

/// Convert console errors to application errors
impl From<ConsoleError> for AppError {
    #[allow(clippy::cognitive_complexity)]
    fn from(err: ConsoleError) -> Self {
        use ConsoleError::{
            DistributionNotFound, EmptyUpload, InvalidKey, InvalidName, Lookup, ObjectExists,
            SameKey, Storage, UnmanagedBucket, UnsupportedFileType,
        };

        let message = err.to_string();
        match err {
            UnmanagedBucket(_) | DistributionNotFound(_) => {
                tracing::debug!("{message}");
                Self::new(StatusCode::NOT_FOUND, "not_found", message, false)
            }
            InvalidKey(_) | InvalidName(_) | UnsupportedFileType(_) | EmptyUpload(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_input", message, false)
            }
            SameKey(_) | ObjectExists(_) => {
                Self::new(StatusCode::CONFLICT, "already_exists", message, false)
            }
            Storage(storage_err) => storage_err.into(),
            Lookup(lookup_err) => lookup_err.into(),
        }
    }
}

/// Convert object storage errors to application errors
impl From<ObjectStorageError> for AppError {
    fn from(err: ObjectStorageError) -> Self {
        use ObjectStorageError::{
            BodyError, BucketNotFound, InvalidRange, ObjectNotFound, S3Error, UpstreamError,
        };

        match &err {
            BucketNotFound(_) | ObjectNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string(), false)
            }
            InvalidRange(_) => Self::new(
                StatusCode::RANGE_NOT_SATISFIABLE,
                "range_not_satisfiable",
                err.to_string(),
                false,
            ),
            UpstreamError(msg) => {
                tracing::error!("S3 upstream error: {msg}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream_error",
                    "S3 service temporarily unavailable",
                    true,
                )
            }
            S3Error(msg) | BodyError(msg) => {
                tracing::error!("S3 error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Storage request failed",
                    true,
                )
            }
        }
    }
}

/// Convert distribution lookup errors to application errors
impl From<DistributionError> for AppError {
    fn from(err: DistributionError) -> Self {
        match &err {
            DistributionError::UpstreamError(msg) => {
                tracing::error!("CloudFront upstream error: {msg}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream_error",
                    "CloudFront service temporarily unavailable",
                    true,
                )
            }
            DistributionError::CloudFrontError(msg) => {
                tracing::error!("CloudFront error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Distribution lookup failed",
                    true,
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_errors_map_to_statuses() {
        let cases = [
            (
                ConsoleError::UnmanagedBucket("private".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ConsoleError::InvalidName("a/b".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ConsoleError::SameKey("a.jpg".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                ConsoleError::Storage(ObjectStorageError::ObjectNotFound("b/k".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ConsoleError::Storage(ObjectStorageError::InvalidRange("b/k".to_string())),
                StatusCode::RANGE_NOT_SATISFIABLE,
            ),
            (
                ConsoleError::Storage(ObjectStorageError::UpstreamError("503".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ConsoleError::Lookup(DistributionError::CloudFrontError("denied".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_upstream_errors_allow_retry() {
        let err = AppError::from(ObjectStorageError::UpstreamError("timeout".to_string()));
        assert!(err.inner.allow_retry);
        assert_eq!(err.code(), "upstream_error");

        let err = AppError::validation("bad");
        assert!(!err.inner.allow_retry);
        assert_eq!(err.code(), "validation_error");
    }
}
