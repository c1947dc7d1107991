//! # gdrive-proxy
//!
//! A thin HTTP proxy exposing a Google Drive folder's image listing and file
//! downloads as a small REST API, with CORS headers and error translation.
//!
//! The heavy lifting (authentication, listing, byte streaming) is delegated
//! to the Drive v3 REST API; this crate marshals query parameters into
//! provider calls and provider responses into JSON.
//!
//! ## Features
//!
//! - **Folder listing**: resolves a pasted folder URL or bare ID to a
//!   canonical identifier and lists the image files inside it
//! - **File streaming**: relays a file's bytes as they arrive from Drive,
//!   with optional provider-generated thumbnails
//! - **Service-account auth**: RS256 JWT-bearer token exchange with a
//!   shared, lock-guarded token cache
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`drive`] - Service-account credentials, token exchange, Drive client
//! - [`gallery`] - Folder-reference resolution and response shaping
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use gdrive_proxy::drive::{DriveClient, ServiceAccountKey};
//! use gdrive_proxy::gallery::GalleryService;
//! use gdrive_proxy::{create_router, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let key = ServiceAccountKey::from_file("./service-account-key.json")?;
//!     let client = DriveClient::new(key)?;
//!     let gallery = GalleryService::new(client);
//!
//!     let router = create_router(gallery, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5001").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod drive;
pub mod error;
pub mod gallery;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use drive::{DriveClient, ServiceAccountKey, DEFAULT_DRIVE_ENDPOINT, LIST_PAGE_SIZE};
pub use error::{DriveError, ListError};
pub use gallery::{
    extract_folder_id, GalleryService, ImageContent, ImageEntry, ImageFile, ImageSource,
    ImageVariant, Listing,
};
pub use server::{
    create_router, AppState, ErrorResponse, HealthResponse, ListingResponse, RouterConfig,
};
