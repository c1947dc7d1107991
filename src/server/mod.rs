//! HTTP server layer for the Drive proxy.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /api/gdrive-images?folderUrl=...   GET /files/{file_id}   │
//! │                                                                 │
//! │  ┌─────────────┐               ┌─────────────────────────────┐  │
//! │  │  handlers   │               │          routes             │  │
//! │  │ (requests)  │               │  (router config + CORS)     │  │
//! │  └─────────────┘               └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, image_handler, listing_handler, AppState, ErrorResponse, HealthResponse,
    ImageQueryParams, ImageServeError, ListingQueryParams, ListingResponse,
};
pub use routes::{create_router, RouterConfig};
