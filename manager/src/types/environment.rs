//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{
    meta::region::RegionProviderChain, retry::RetryConfig, timeout::TimeoutConfig,
    BehaviorVersion, Region,
};
use aws_credential_types::Credentials;
use tracing::Level;

/// Region used when none is configured. `CloudFront` is a global service
/// homed in `us-east-1`.
const DEFAULT_REGION: &str = "us-east-1";

/// `LocalStack` edge endpoint used in development
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Bucket name keywords used when `BUCKET_NAME_KEYWORDS` is unset
const DEFAULT_BUCKET_KEYWORDS: [&str; 2] = ["www", "cdn"];

/// Default request body limit: 512 MiB, enough for short video clips
const DEFAULT_MAX_UPLOAD_SIZE_BYTES: usize = 512 * 1024 * 1024;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack` unless overridden)
    Development {
        /// Optional override for the AWS endpoint, read from `AWS_ENDPOINT_URL`
        endpoint_override: Option<String>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                endpoint_override: env::var("AWS_ENDPOINT_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
            },
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Bucket preselected in the console, from `CLOUDFRONT_DIST_NAME`.
    ///
    /// Buckets are named after the CDN domain serving them, so this is both the
    /// default bucket and the CDN host.
    #[must_use]
    pub fn default_bucket(&self) -> Option<String> {
        env::var("CLOUDFRONT_DIST_NAME")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Keywords a bucket name must contain to be managed by the console
    #[must_use]
    pub fn bucket_name_keywords(&self) -> Vec<String> {
        env::var("BUCKET_NAME_KEYWORDS").map_or_else(
            |_| {
                DEFAULT_BUCKET_KEYWORDS
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            },
            |raw| {
                raw.split(',')
                    .map(|keyword| keyword.trim().to_lowercase())
                    .filter(|keyword| !keyword.is_empty())
                    .collect()
            },
        )
    }

    /// Static credentials from `ACCESS_KEY` / `SECRET_KEY`.
    ///
    /// Development falls back to the dummy `LocalStack` credentials; other
    /// environments fall back to the default provider chain (`None`).
    #[must_use]
    pub fn static_credentials(&self) -> Option<Credentials> {
        let access_key = env::var("ACCESS_KEY").ok().filter(|v| !v.is_empty());
        let secret_key = env::var("SECRET_KEY").ok().filter(|v| !v.is_empty());

        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => Some(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "cdn-manager-env",
            )),
            _ if matches!(self, Self::Development { .. }) => {
                Some(Credentials::new("test", "test", None, None, "localstack"))
            }
            _ => None,
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            Self::Development { endpoint_override } => {
                Some(endpoint_override.as_deref().unwrap_or(LOCALSTACK_ENDPOINT))
            }
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let region = RegionProviderChain::default_provider().or_else(Region::new(DEFAULT_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// AWS `CloudFront` service configuration
    pub async fn cloudfront_client_config(&self) -> aws_sdk_cloudfront::Config {
        let aws_config = self.aws_config().await;
        (&aws_config).into()
    }

    /// Maximum accepted request body, from `MAX_UPLOAD_SIZE_BYTES`
    #[must_use]
    pub fn max_upload_size_bytes(&self) -> usize {
        env::var("MAX_UPLOAD_SIZE_BYTES")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE_BYTES)
    }

    /// Per-request timeout, from `REQUEST_TIMEOUT_SECS`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Log level used when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}
