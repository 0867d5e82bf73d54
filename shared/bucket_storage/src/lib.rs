//! Storage seams for the CDN manager
//!
//! This crate wraps the two managed services the console talks to: the S3
//! object store holding the media and the `CloudFront` distributions fronting
//! it. Both are exposed as traits so the console can be exercised against the
//! in-memory implementations enabled by the `test-utils` feature.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod distribution;
pub mod object;

pub use distribution::{
    CloudFrontDirectory, Distribution, DistributionDirectory, DistributionError,
    DistributionResult,
};
pub use object::{
    ObjectContent, ObjectStorageError, ObjectStorageResult, ObjectStore, ObjectSummary,
    S3ObjectStore,
};

/// Percent-encodes every segment of an object key, keeping the `/` separators.
///
/// Used both for `CopySource` headers and for CDN URLs.
#[must_use]
pub fn encode_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
