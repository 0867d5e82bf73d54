mod common;

use common::*;

use bucket_storage::object::StorageCall;
use http::StatusCode;
use pretty_assertions::assert_eq;

fn seeded() -> TestSetup {
    let setup = TestSetup::new();
    for key in [
        "car-shows/photo/front.jpg",
        "car-shows/photo/rear.png",
        "car-shows/video/walkaround.mp4",
        "offroad/general/notes.txt",
        "race-events/photo/my car.jpg",
    ] {
        setup.store.insert(CDN_BUCKET, key, "data", None);
    }
    setup.store.clear_calls();
    setup
}

fn keys(body: &serde_json::Value) -> Vec<String> {
    body["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|object| object["key"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_whole_bucket() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["bucket"], CDN_BUCKET);
    assert_eq!(body["prefix"], "");
    assert_eq!(body["count"], 5);
    assert_eq!(
        keys(&body),
        vec![
            "car-shows/photo/front.jpg",
            "car-shows/photo/rear.png",
            "car-shows/video/walkaround.mp4",
            "offroad/general/notes.txt",
            "race-events/photo/my car.jpg",
        ]
    );

    let front = &body["objects"][0];
    assert_eq!(front["name"], "front.jpg");
    assert_eq!(front["kind"], "image");
    assert_eq!(front["size"], 4);
    assert_eq!(front["cdn_url"], "https://cdn.example.com/car-shows/photo/front.jpg");
    assert_eq!(front["download_url"], front["cdn_url"]);
    assert_eq!(
        front["content_url"],
        "/v1/buckets/cdn.example.com/content?key=car-shows%2Fphoto%2Ffront.jpg"
    );
    assert!(front["last_modified"].is_string());

    assert_eq!(body["objects"][2]["kind"], "video");
    assert_eq!(body["objects"][3]["kind"], "other");

    assert_eq!(
        setup.store.calls(),
        vec![StorageCall::ListObjects {
            bucket: CDN_BUCKET.to_string(),
            prefix: String::new(),
        }]
    );
}

#[tokio::test]
async fn test_list_by_category() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?category=car-shows")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["prefix"], "car-shows/");
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn test_list_by_category_and_subcategory() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?category=car-shows&subcategory=photo")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["prefix"], "car-shows/photo/");
    assert_eq!(
        keys(&body),
        vec!["car-shows/photo/front.jpg", "car-shows/photo/rear.png"]
    );
}

#[tokio::test]
async fn test_subcategory_without_category_lists_everything() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?subcategory=video")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["prefix"], "");
    assert_eq!(body["count"], 5);
}

#[tokio::test]
async fn test_empty_folder() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?category=food&subcategory=video")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["objects"], serde_json::json!([]));
}

#[tokio::test]
async fn test_keys_with_spaces_are_encoded() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?category=race-events")
        .await;
    let body = parse_response_body(response).await;

    let object = &body["objects"][0];
    assert_eq!(object["key"], "race-events/photo/my car.jpg");
    assert_eq!(
        object["cdn_url"],
        "https://cdn.example.com/race-events/photo/my%20car.jpg"
    );
    assert_eq!(
        object["content_url"],
        "/v1/buckets/cdn.example.com/content?key=race-events%2Fphoto%2Fmy%20car.jpg"
    );
}

#[tokio::test]
async fn test_unknown_category_is_rejected() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.example.com/objects?category=ALL")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(setup.store.calls().is_empty());
}

#[tokio::test]
async fn test_unmanaged_bucket_is_not_found() {
    let setup = seeded();
    setup
        .store
        .insert(PRIVATE_BUCKET, "misc/photo/invoice.png", "data", None);
    setup.store.clear_calls();

    let response = setup
        .send_get_request("/v1/buckets/billing-exports/objects")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    assert_eq!(error_code(&body), "not_found");
    assert_eq!(body["allowRetry"], false);
    assert!(setup.store.calls().is_empty());
}

#[tokio::test]
async fn test_default_bucket_is_managed() {
    let setup = seeded();
    setup
        .store
        .insert(DEFAULT_BUCKET, "misc/photo/logo.png", "data", Some("image/png"));

    let response = setup
        .send_get_request("/v1/buckets/media.example.org/objects")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(keys(&body), vec!["misc/photo/logo.png"]);
}

#[tokio::test]
async fn test_missing_managed_bucket() {
    let setup = seeded();

    let response = setup
        .send_get_request("/v1/buckets/cdn.missing.example/objects")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    assert_eq!(error_code(&body), "not_found");
}
