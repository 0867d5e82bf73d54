pub mod buckets;
pub mod catalog;
pub mod distributions;
pub mod objects;
pub mod uploads;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/v1/catalog", get(catalog::get_catalog))
        .api_route("/v1/buckets", get(buckets::list_buckets))
        .api_route(
            "/v1/buckets/{bucket}/objects",
            get(objects::list_objects)
                .post(uploads::upload_object)
                .delete(objects::delete_object),
        )
        .api_route(
            "/v1/buckets/{bucket}/objects/rename",
            post(objects::rename_object),
        )
        // Raw bytes for thumbnails and video previews, kept out of the OpenAPI document
        .route(
            "/v1/buckets/{bucket}/content",
            axum::routing::get(objects::object_content),
        )
        .api_route(
            "/v1/distributions/{domain}",
            get(distributions::get_distribution),
        )
}
