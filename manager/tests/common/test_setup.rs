use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use bucket_storage::distribution::InMemoryDistributionDirectory;
use bucket_storage::object::InMemoryObjectStore;
use bucket_storage::Distribution;
use manager::{console::BucketConsole, server, types::Environment};
use tower::ServiceExt;

use super::MultipartForm;

/// Managed through the `cdn` keyword
pub const CDN_BUCKET: &str = "cdn.example.com";
/// Managed through the `www` keyword
pub const WWW_BUCKET: &str = "www.example.org";
/// Managed because it is the default bucket
pub const DEFAULT_BUCKET: &str = "media.example.org";
/// Not managed by the console
pub const PRIVATE_BUCKET: &str = "billing-exports";

pub const DISTRIBUTION_DOMAIN: &str = "d111111abcdef8.cloudfront.net";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router over in-memory buckets and distributions
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<InMemoryObjectStore>,
}

impl TestSetup {
    pub fn new() -> Self {
        let store = InMemoryObjectStore::new()
            .with_bucket(CDN_BUCKET)
            .with_bucket(WWW_BUCKET)
            .with_bucket(DEFAULT_BUCKET)
            .with_bucket(PRIVATE_BUCKET);
        Self::with_store(store)
    }

    pub fn with_store(store: InMemoryObjectStore) -> Self {
        Self::build(
            store,
            Environment::Development {
                endpoint_override: None,
            },
        )
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self::build(InMemoryObjectStore::new().with_bucket(CDN_BUCKET), environment)
    }

    fn build(store: InMemoryObjectStore, environment: Environment) -> Self {
        setup_test_env();

        let store = Arc::new(store);
        let distributions = InMemoryDistributionDirectory::new(vec![Distribution {
            id: "E2QWRUHAPOMQZL".to_string(),
            domain_name: DISTRIBUTION_DOMAIN.to_string(),
            aliases: vec!["assets.example.net".to_string()],
            status: "Deployed".to_string(),
            enabled: true,
        }]);

        let console = Arc::new(BucketConsole::new(
            store.clone(),
            Arc::new(distributions),
            vec!["www".to_string(), "cdn".to_string()],
            Some(DEFAULT_BUCKET.to_string()),
        ));

        Self {
            router: server::router(environment, console),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn send_ranged_get_request(&self, route: &str, range: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .header("Range", range)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send_delete_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("DELETE")
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send_post_request(&self, route: &str, payload: serde_json::Value) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send_multipart_request(&self, route: &str, form: MultipartForm) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", form.content_type())
            .body(Body::from(form.into_body()))
            .expect("Failed to build request");
        self.send(request).await
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response_bytes(response).await;
    serde_json::from_slice(&body).expect("Response body is not JSON")
}

pub async fn response_bytes(response: Response) -> bytes::Bytes {
    use http_body_util::BodyExt;

    response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes()
}

/// Asserts the error envelope and returns its code
pub fn error_code(body: &serde_json::Value) -> &str {
    assert!(body["allowRetry"].is_boolean(), "not an error envelope: {body}");
    assert!(body["error"]["message"].is_string(), "missing message: {body}");
    body["error"]["code"].as_str().expect("missing error code")
}
