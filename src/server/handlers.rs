//! HTTP request handlers for the Drive proxy API.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/gdrive-images?folderUrl=...` - List images in a folder
//! - `GET /files/{file_id}` - Serve one file's bytes
//! - `GET /api/gdrive-image/{file_id}` - Legacy alias for the above

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{DriveError, ListError};
use crate::gallery::{GalleryService, ImageEntry, ImageSource, ImageVariant, Listing};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to all handlers via Axum's State
/// extractor.
pub struct AppState<S: ImageSource> {
    /// The gallery service for listing folders and fetching files
    pub gallery: GalleryService<S>,

    /// Cache-Control max-age in seconds for served images
    pub cache_max_age: u32,
}

impl<S: ImageSource> AppState<S> {
    /// Create a new application state with the given gallery service.
    pub fn new(gallery: GalleryService<S>) -> Self {
        Self {
            gallery,
            cache_max_age: 3600, // 1 hour default
        }
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(gallery: GalleryService<S>, cache_max_age: u32) -> Self {
        Self {
            gallery,
            cache_max_age,
        }
    }
}

impl<S: ImageSource> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gallery: self.gallery.clone(),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListingQueryParams {
    /// Folder reference: a Drive URL, a URL with an id= parameter, or a
    /// bare folder ID
    #[serde(default, rename = "folderUrl")]
    pub folder_url: Option<String>,
}

/// Query parameters for the file-serving endpoint.
#[derive(Debug, Deserialize)]
pub struct ImageQueryParams {
    /// Requested rendition; only "thumbnail" has an effect
    #[serde(default)]
    pub size: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response for the file-serving endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error string
    pub error: String,

    /// Human-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Create an error response without detail.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// Create an error response with a human-readable message.
    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Current time as an ISO-8601 timestamp
    pub timestamp: String,
}

/// Response from the listing endpoint, success or failure.
///
/// On failure `images` is empty, `total_count` is zero and `error` is
/// populated; on success the `error`/`message` keys are absent from the JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub success: bool,

    pub images: Vec<ImageEntry>,

    pub total_count: usize,

    pub folder_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ListingResponse {
    /// Build a success response from a listing.
    pub fn from_listing(listing: Listing) -> Self {
        Self {
            success: true,
            total_count: listing.images.len(),
            images: listing.images,
            folder_id: listing.folder_id,
            error: None,
            message: None,
        }
    }

    /// Build a failure response.
    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            images: Vec::new(),
            total_count: 0,
            folder_id: String::new(),
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ListError to an HTTP response.
///
/// The body is always a failure-shaped [`ListingResponse`]. An unreachable
/// folder (not found, not shared) is invalid input on this surface and maps
/// to 400; only genuinely internal failures map to 500. 4xx errors are
/// logged at DEBUG/WARN, 5xx at ERROR.
impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ListError::MissingFolderRef => (
                StatusCode::BAD_REQUEST,
                "No folder URL provided",
                "Please provide a Google Drive folder URL",
            ),

            ListError::InvalidFolderRef { .. } => (
                StatusCode::BAD_REQUEST,
                "Invalid folder URL",
                "Could not extract folder ID from the provided URL",
            ),

            ListError::Drive(DriveError::NotFound(_)) => (
                StatusCode::BAD_REQUEST,
                "Folder not found",
                "The folder does not exist or is not accessible",
            ),

            ListError::Drive(DriveError::Forbidden(_)) => (
                StatusCode::BAD_REQUEST,
                "Access denied",
                "The folder is not shared with the service account",
            ),

            // Incomplete entries and every other provider failure
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "Failed to fetch images from Google Drive",
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Listing failed: {}", self);
        } else {
            match &self {
                ListError::Drive(_) => {
                    warn!(status = status.as_u16(), "Listing rejected: {}", self)
                }
                _ => debug!(status = status.as_u16(), "Listing rejected: {}", self),
            }
        }

        let body = ListingResponse::failure(error, message);
        (status, Json(body)).into_response()
    }
}

/// Wrapper for file-serving errors to implement IntoResponse.
///
/// Every provider failure on this path is a 500 with the underlying message
/// echoed to the caller. That is deliberately looser than the listing path
/// and matches the legacy surface; the full error is also logged.
pub struct ImageServeError(pub DriveError);

impl IntoResponse for ImageServeError {
    fn into_response(self) -> Response {
        error!("Failed to serve image: {}", self.0);

        let body = ErrorResponse::with_message("Failed to serve image", self.0.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

impl From<DriveError> for ImageServeError {
    fn from(err: DriveError) -> Self {
        ImageServeError(err)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "OK",
///   "timestamp": "2024-05-01T12:00:00.000Z"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handle folder listing requests.
///
/// # Endpoint
///
/// `GET /api/gdrive-images?folderUrl=<reference>`
///
/// # Query Parameters
///
/// - `folderUrl`: Drive folder URL, URL with an `id=` parameter, or bare
///   folder ID (required)
///
/// # Response
///
/// - `200 OK`: listing with `success: true`
/// - `400 Bad Request`: missing/invalid reference, folder unreachable
/// - `500 Internal Server Error`: provider or internal failure
///
/// Failure bodies keep the listing shape with `success: false` and a stable
/// `error` string.
pub async fn listing_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListingQueryParams>,
) -> Result<Json<ListingResponse>, ListError> {
    let folder_ref = query.folder_url.unwrap_or_default();

    let listing = state.gallery.list_images(&folder_ref).await?;

    Ok(Json(ListingResponse::from_listing(listing)))
}

/// Handle file-serving requests.
///
/// # Endpoint
///
/// `GET /files/{file_id}` (also aliased as `GET /api/gdrive-image/{file_id}`)
///
/// # Path Parameters
///
/// - `file_id`: Drive file identifier, as returned by the listing endpoint
///
/// # Query Parameters
///
/// - `size`: `thumbnail` to serve the provider-generated thumbnail; any
///   other value serves the original bytes
///
/// # Response
///
/// - `200 OK`: raw bytes, streamed, with the provider-reported
///   `Content-Type` (falling back to `application/octet-stream`) and
///   `Cache-Control: public, max-age={cache_max_age}`
/// - `500 Internal Server Error`: provider failure, JSON `{error, message}`
pub async fn image_handler<S: ImageSource>(
    State(state): State<AppState<S>>,
    Path(file_id): Path<String>,
    Query(query): Query<ImageQueryParams>,
) -> Result<Response, ImageServeError> {
    let variant = ImageVariant::from_size_param(query.size.as_deref());

    let content = state.gallery.fetch_image(&file_id, variant).await?;

    let content_type = content
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        )
        .body(Body::from_stream(content.body))
        .map_err(|e| ImageServeError(DriveError::Api(e.to_string())))?;

    Ok(response)
}

/// Reject file requests with no ID segment.
///
/// `GET /files` and `GET /files/` (and the legacy alias) land here.
pub async fn missing_file_id_handler() -> Response {
    debug!("File request without an ID segment");

    let body = ErrorResponse::new("File ID is required");
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Reject non-GET methods on the API endpoints.
pub async fn method_not_allowed_handler() -> Response {
    let body = ErrorResponse::new("Method not allowed");
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}
