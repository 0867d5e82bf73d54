mod docs;
mod health;
mod ui;
pub mod v1;

use aide::axum::{routing::get, ApiRouter};

use crate::types::Environment;

/// Creates the router with all handler routes
///
/// `/docs` and `/openapi.json` only exist where the environment shows API docs.
pub fn handler(environment: &Environment) -> ApiRouter {
    let router = ApiRouter::new()
        .route("/", axum::routing::get(ui::index))
        .api_route("/health", get(health::handler))
        .merge(v1::handler());

    if environment.show_api_docs() {
        router.merge(docs::handler())
    } else {
        router
    }
}
