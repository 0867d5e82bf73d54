use std::sync::Arc;

use aws_sdk_cloudfront::Client as CloudFrontClient;
use aws_sdk_s3::Client as S3Client;
use bucket_storage::{CloudFrontDirectory, S3ObjectStore};
use manager::{console::BucketConsole, server, types::Environment};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // RUST_LOG wins over TRACING_LEVEL when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().to_string()));

    // JSON logs for staging/production, human readable for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(filter).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let cloudfront_client = Arc::new(CloudFrontClient::from_conf(
        environment.cloudfront_client_config().await,
    ));

    let default_bucket = environment.default_bucket();
    if default_bucket.is_none() {
        tracing::warn!("CLOUDFRONT_DIST_NAME is not set, the console has no default bucket");
    }

    let console = Arc::new(BucketConsole::new(
        Arc::new(S3ObjectStore::new(s3_client)),
        Arc::new(CloudFrontDirectory::new(cloudfront_client)),
        environment.bucket_name_keywords(),
        default_bucket,
    ));

    server::start(environment, console).await
}
