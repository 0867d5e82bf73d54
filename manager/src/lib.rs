//! CDN Manager: a web console for browsing and managing media in
//! CloudFront-backed S3 buckets

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

/// Key layout of the managed buckets
pub mod catalog;

/// Bucket operations behind the HTTP API
pub mod console;

/// HTTP routes
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Shared types: environment, errors and extractors
pub mod types;
