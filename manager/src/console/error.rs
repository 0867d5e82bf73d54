//! Error types for console operations

use bucket_storage::{DistributionError, ObjectStorageError};
use thiserror::Error;

/// Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Errors raised by console operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The bucket name does not match the managed-bucket keywords
    #[error("Bucket is not managed by this console: {0}")]
    UnmanagedBucket(String),

    /// Empty or malformed object key
    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),

    /// Empty item name, or one containing a path separator
    #[error("Invalid item name: {0:?}")]
    InvalidName(String),

    /// Upload with an extension outside the accepted set
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Upload without content
    #[error("Uploaded file is empty: {0}")]
    EmptyUpload(String),

    /// Rename whose target is the object itself
    #[error("Object is already named {0}")]
    SameKey(String),

    /// Rename onto a key that is already taken
    #[error("Object already exists: {0}")]
    ObjectExists(String),

    /// No distribution serves the domain
    #[error("No distribution serves {0}")]
    DistributionNotFound(String),

    /// Object store failure
    #[error(transparent)]
    Storage(#[from] ObjectStorageError),

    /// Distribution lookup failure
    #[error(transparent)]
    Lookup(#[from] DistributionError),
}
