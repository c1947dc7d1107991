//! API integration tests for the listing and file-serving endpoints.
//!
//! Tests verify:
//! - Folder listings (success shapes, resolution failures, provider errors)
//! - File serving (content types, cache headers, thumbnails, aliases)
//! - CORS headers and method filtering
//! - HTTP response codes and JSON error shapes

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gdrive_proxy::error::DriveError;
use gdrive_proxy::gallery::GalleryService;
use gdrive_proxy::{create_router, RouterConfig};

use super::test_utils::{image_file, MockImageSource};

// 33-char Drive-shaped folder ID
const FOLDER_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz01234";

// FOLDER_ID's drive.google.com URL, percent-encoded as a query value
const ENCODED_FOLDER_URL: &str =
    "https%3A%2F%2Fdrive.google.com%2Fdrive%2Ffolders%2F1AbCdEfGhIjKlMnOpQrStUvWxYz01234";

fn make_router(source: MockImageSource) -> axum::Router {
    create_router(GalleryService::new(source), RouterConfig::new())
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = make_router(MockImageSource::new());

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = json_body(response).await;
    assert_eq!(health["status"], "OK");
    assert!(health["timestamp"].is_string());
}

// =============================================================================
// Folder Listing
// =============================================================================

#[tokio::test]
async fn test_listing_success() {
    let source = MockImageSource::new().with_folder(
        FOLDER_ID,
        vec![image_file("file-a"), image_file("file-b"), image_file("file-c")],
    );
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", ENCODED_FOLDER_URL))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = json_body(response).await;
    assert_eq!(listing["success"], true);
    assert_eq!(listing["totalCount"], 3);
    assert_eq!(listing["folderId"], FOLDER_ID);
    assert_eq!(listing["images"].as_array().unwrap().len(), 3);

    // Entry URLs point back at this proxy
    assert_eq!(listing["images"][0]["url"], "/files/file-a");
    assert_eq!(
        listing["images"][0]["thumbnailUrl"],
        "/files/file-a?size=thumbnail"
    );
    assert_eq!(listing["images"][0]["mimeType"], "image/jpeg");

    // Success responses carry no error keys
    assert!(listing.get("error").is_none());
    assert!(listing.get("message").is_none());
}

#[tokio::test]
async fn test_listing_accepts_bare_folder_id() {
    let source = MockImageSource::new().with_folder(FOLDER_ID, vec![image_file("file-a")]);
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = json_body(response).await;
    assert_eq!(listing["folderId"], FOLDER_ID);
}

#[tokio::test]
async fn test_listing_missing_folder_url() {
    let router = make_router(MockImageSource::new());

    let request = Request::builder()
        .uri("/api/gdrive-images")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = json_body(response).await;
    assert_eq!(listing["success"], false);
    assert_eq!(listing["error"], "No folder URL provided");
    assert_eq!(listing["totalCount"], 0);
    assert_eq!(listing["images"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_listing_empty_folder_url() {
    let router = make_router(MockImageSource::new());

    let request = Request::builder()
        .uri("/api/gdrive-images?folderUrl=")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = json_body(response).await;
    assert_eq!(listing["error"], "No folder URL provided");
}

#[tokio::test]
async fn test_listing_invalid_folder_url() {
    let router = make_router(MockImageSource::new());

    // No pattern yields a 25+ char token
    let request = Request::builder()
        .uri("/api/gdrive-images?folderUrl=not-a-valid-ref")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = json_body(response).await;
    assert_eq!(listing["success"], false);
    assert_eq!(listing["error"], "Invalid folder URL");
}

#[tokio::test]
async fn test_listing_folder_not_found() {
    // Valid reference, but the mock knows no such folder
    let router = make_router(MockImageSource::new());

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = json_body(response).await;
    assert_eq!(listing["error"], "Folder not found");
    assert_eq!(
        listing["message"],
        "The folder does not exist or is not accessible"
    );
}

#[tokio::test]
async fn test_listing_access_denied() {
    let source = MockImageSource::new()
        .with_list_error(DriveError::Forbidden("folder not shared".to_string()));
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let listing = json_body(response).await;
    assert_eq!(listing["error"], "Access denied");
}

#[tokio::test]
async fn test_listing_provider_failure_is_internal_error() {
    let source = MockImageSource::new()
        .with_list_error(DriveError::Transport("connection reset".to_string()));
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let listing = json_body(response).await;
    assert_eq!(listing["success"], false);
    assert_eq!(listing["error"], "Internal server error");
    // The transport detail stays server-side
    assert_eq!(
        listing["message"],
        "Failed to fetch images from Google Drive"
    );
}

#[tokio::test]
async fn test_listing_incomplete_entry_fails_request() {
    let mut broken = image_file("file-b");
    broken.size = None;

    let source =
        MockImageSource::new().with_folder(FOLDER_ID, vec![image_file("file-a"), broken]);
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    // The whole listing fails; entries are never silently dropped
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let listing = json_body(response).await;
    assert_eq!(listing["success"], false);
    assert_eq!(listing["error"], "Internal server error");
    assert_eq!(listing["images"].as_array().unwrap().len(), 0);
}

// =============================================================================
// File Serving
// =============================================================================

#[tokio::test]
async fn test_file_serving_success() {
    let source = MockImageSource::new().with_file("file-a", Some("image/png"), b"png-bytes");
    let router = make_router(source);

    let request = Request::builder()
        .uri("/files/file-a")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=3600"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"png-bytes");
}

#[tokio::test]
async fn test_file_serving_legacy_alias() {
    let source = MockImageSource::new().with_file("file-a", Some("image/png"), b"png-bytes");
    let router = make_router(source);

    let request = Request::builder()
        .uri("/api/gdrive-image/file-a")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"png-bytes");
}

#[tokio::test]
async fn test_file_serving_content_type_fallback() {
    let source = MockImageSource::new().with_file("file-a", None, b"mystery-bytes");
    let router = make_router(source);

    let request = Request::builder()
        .uri("/files/file-a")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_file_serving_thumbnail_variant() {
    let source = MockImageSource::new()
        .with_file("file-a", Some("image/png"), b"full-bytes")
        .with_thumbnail("file-a", "image/jpeg", b"thumb-bytes");
    let router = make_router(source);

    let request = Request::builder()
        .uri("/files/file-a?size=thumbnail")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"thumb-bytes");
}

#[tokio::test]
async fn test_file_serving_unknown_size_serves_original() {
    let source = MockImageSource::new()
        .with_file("file-a", Some("image/png"), b"full-bytes")
        .with_thumbnail("file-a", "image/jpeg", b"thumb-bytes");
    let router = make_router(source);

    let request = Request::builder()
        .uri("/files/file-a?size=large")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"full-bytes");
}

#[tokio::test]
async fn test_file_serving_provider_error() {
    let source = MockImageSource::new()
        .with_fetch_error(DriveError::Transport("connection reset".to_string()));
    let router = make_router(source);

    let request = Request::builder()
        .uri("/files/file-a")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error = json_body(response).await;
    assert_eq!(error["error"], "Failed to serve image");
    // The raw underlying message is echoed on this path
    assert!(error["message"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_file_serving_missing_id_segment() {
    let router = make_router(MockImageSource::new());

    for uri in ["/files", "/files/", "/api/gdrive-image", "/api/gdrive-image/"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{} should be rejected",
            uri
        );

        let error = json_body(response).await;
        assert_eq!(error["error"], "File ID is required");
    }
}

// =============================================================================
// Referential Consistency
// =============================================================================

#[tokio::test]
async fn test_listed_ids_resolve_through_file_endpoint() {
    let source = MockImageSource::new()
        .with_folder(FOLDER_ID, vec![image_file("file-a"), image_file("file-b")])
        .with_file("file-a", Some("image/jpeg"), b"bytes-a")
        .with_file("file-b", Some("image/jpeg"), b"bytes-b");
    let router = make_router(source);

    let request = Request::builder()
        .uri(format!("/api/gdrive-images?folderUrl={}", FOLDER_ID))
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let listing = json_body(response).await;

    for image in listing["images"].as_array().unwrap() {
        let url = image["url"].as_str().unwrap();
        let id = image["id"].as_str().unwrap();
        assert_eq!(url, format!("/files/{}", id));

        let request = Request::builder().uri(url).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{} should serve", url);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], format!("bytes-{}", &id[5..]).as_bytes());
    }
}

// =============================================================================
// CORS and Method Filtering
// =============================================================================

#[tokio::test]
async fn test_options_returns_200_with_cors_headers() {
    let router = make_router(MockImageSource::new());

    for uri in ["/api/gdrive-images", "/files/file-a", "/anything/else"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {} failed", uri);

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-methods")
                .unwrap(),
            "GET, POST, OPTIONS"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-headers")
                .unwrap(),
            "Content-Type"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty(), "OPTIONS body should be empty");
    }
}

#[tokio::test]
async fn test_cors_headers_on_every_response() {
    let source = MockImageSource::new().with_file("file-a", Some("image/png"), b"png-bytes");
    let router = make_router(source);

    // Success, client error and 404 all carry the headers
    for uri in ["/files/file-a", "/api/gdrive-images", "/nonexistent"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*",
            "{} is missing CORS headers",
            uri
        );
    }
}

#[tokio::test]
async fn test_fixed_allowed_origin() {
    let router = create_router(
        GalleryService::new(MockImageSource::new()),
        RouterConfig::new().with_allowed_origin("https://gallery.example.com"),
    );

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://gallery.example.com"
    );
}

#[tokio::test]
async fn test_non_get_methods_rejected() {
    let router = make_router(MockImageSource::new());

    for (method, uri) in [
        ("POST", "/api/gdrive-images"),
        ("DELETE", "/files/file-a"),
        ("PUT", "/api/gdrive-image/file-a"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{} {} should be rejected",
            method,
            uri
        );

        let error = json_body(response).await;
        assert_eq!(error["error"], "Method not allowed");
    }
}

// =============================================================================
// Cache Headers
// =============================================================================

#[tokio::test]
async fn test_custom_cache_max_age() {
    let source = MockImageSource::new().with_file("file-a", Some("image/png"), b"png-bytes");
    let router = create_router(
        GalleryService::new(source),
        RouterConfig::new().with_cache_max_age(60),
    );

    let request = Request::builder()
        .uri("/files/file-a")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "public, max-age=60"
    );
}
