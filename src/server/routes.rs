//! Router configuration for the Drive proxy.
//!
//! This module defines the HTTP routes and applies middleware for CORS and
//! request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /api/health                  - Health check
//! /api/gdrive-images           - Folder listing (?folderUrl=...)
//! /files/{file_id}             - File bytes (?size=thumbnail)
//! /api/gdrive-image/{file_id}  - Legacy alias for /files
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gdrive_proxy::gallery::GalleryService;
//! use gdrive_proxy::server::routes::{create_router, RouterConfig};
//!
//! let gallery = GalleryService::new(drive_client);
//!
//! let config = RouterConfig::new()
//!     .with_allowed_origin("https://example.com");
//!
//! let router = create_router(gallery, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers::{
    health_handler, image_handler, listing_handler, method_not_allowed_handler,
    missing_file_id_handler, AppState,
};
use crate::gallery::{GalleryService, ImageSource};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// CORS allowed origin: "*" or a fixed origin
    pub allowed_origin: String,

    /// Cache-Control max-age in seconds for served images
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with defaults.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set the CORS allowed origin ("*" or a fixed origin).
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CORS Middleware
// =============================================================================

/// CORS headers stamped on every response.
///
/// The legacy surface promises these headers unconditionally, including on
/// error responses and for requests without an Origin header, so they are
/// applied by middleware rather than a negotiating CORS layer.
#[derive(Clone)]
struct CorsPolicy {
    allow_origin: HeaderValue,
}

impl CorsPolicy {
    fn from_origin(origin: &str) -> Self {
        let allow_origin = origin.parse().unwrap_or_else(|_| {
            warn!(
                origin = origin,
                "Allowed origin is not a valid header value, falling back to \"*\""
            );
            HeaderValue::from_static("*")
        });
        Self { allow_origin }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("access-control-allow-origin", self.allow_origin.clone());
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static("Content-Type"),
        );
    }
}

/// Stamp CORS headers on every response and answer preflight requests.
///
/// OPTIONS to any path short-circuits with an empty 200 before routing,
/// exactly like the surface this proxy replaces.
async fn cors_middleware(State(policy): State<CorsPolicy>, req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        policy.apply(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    policy.apply(response.headers_mut());
    response
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The health, listing and file-serving routes
/// - 405 JSON responses for non-GET methods on API routes
/// - Unconditional CORS headers and OPTIONS handling
/// - Request tracing (optional)
///
/// # Arguments
///
/// * `gallery` - The gallery service for handling requests
/// * `config` - Router configuration
///
/// # Returns
///
/// A configured Axum router ready to be served.
pub fn create_router<S>(gallery: GalleryService<S>, config: RouterConfig) -> Router
where
    S: ImageSource + 'static,
{
    let app_state = AppState::with_cache_max_age(gallery, config.cache_max_age);
    let policy = CorsPolicy::from_origin(&config.allowed_origin);

    // A request with an empty ID segment ("/files", "/files/" and the alias
    // forms) gets the 400 JSON shape instead of a bare 404. Trailing-slash
    // paths are distinct routes and are registered explicitly.
    let serve_file = get(image_handler::<S>).fallback(method_not_allowed_handler);
    let missing_id = get(missing_file_id_handler).fallback(method_not_allowed_handler);

    let router = Router::new()
        .route(
            "/api/health",
            get(health_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/api/gdrive-images",
            get(listing_handler::<S>).fallback(method_not_allowed_handler),
        )
        .route("/files", missing_id.clone())
        .route("/files/", missing_id.clone())
        .route("/files/{file_id}", serve_file.clone())
        .route("/api/gdrive-image", missing_id.clone())
        .route("/api/gdrive-image/", missing_id)
        .route("/api/gdrive-image/{file_id}", serve_file)
        .with_state(app_state)
        .layer(middleware::from_fn_with_state(policy, cors_middleware));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
