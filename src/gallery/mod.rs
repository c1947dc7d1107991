//! Image gallery abstraction layer.
//!
//! This module sits between the HTTP handlers and the storage provider:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            GalleryService               │
//! │  (resolves folder refs, shapes entries) │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           ImageSource trait             │
//! │   (provider-agnostic image interface)   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              DriveClient                │
//! │        (Drive v3 REST + OAuth2)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The service owns the two operations the proxy exposes: turning a folder
//! reference into a listing of image entries, and relaying one file's bytes.
//! Tests swap the real Drive client for a mock `ImageSource`.

mod resolver;
mod service;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::DriveError;

pub use resolver::extract_folder_id;
pub use service::{GalleryService, ImageEntry, Listing};

/// Which rendition of a file the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    /// The file's own bytes
    Original,

    /// The provider-generated thumbnail (`?size=thumbnail`)
    Thumbnail,
}

impl ImageVariant {
    /// Map the `size` query parameter onto a variant.
    ///
    /// Only the literal `thumbnail` selects the thumbnail; any other value
    /// (or no value) means the original.
    pub fn from_size_param(size: Option<&str>) -> Self {
        match size {
            Some("thumbnail") => ImageVariant::Thumbnail,
            _ => ImageVariant::Original,
        }
    }
}

/// Raw file metadata as the provider reports it.
///
/// All fields are optional because Drive only returns what was asked for and
/// omits what it does not know (e.g. `size` on Google-native documents).
/// Requiredness is enforced when shaping an [`ImageEntry`], not here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub size: Option<String>,
    pub created_time: Option<String>,
}

/// Streamed bytes for a single file, relayed as they arrive.
pub type ImageStream = BoxStream<'static, Result<Bytes, DriveError>>;

/// One file's content as fetched from the provider.
pub struct ImageContent {
    /// Content type as reported by the provider, if any
    pub content_type: Option<String>,

    /// The file's bytes
    pub body: ImageStream,
}

/// A source of images addressed by opaque provider identifiers.
///
/// Implemented by [`crate::drive::DriveClient`] for the real service and by
/// mock sources in tests. Implementations must be safe to share across
/// concurrent request handlers.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// List image-typed files inside the given folder.
    ///
    /// Returns provider order (newest creation time first), at most one page.
    async fn list_images(&self, folder_id: &str) -> Result<Vec<ImageFile>, DriveError>;

    /// Fetch one file's bytes in the requested variant.
    async fn fetch_image(
        &self,
        file_id: &str,
        variant: ImageVariant,
    ) -> Result<ImageContent, DriveError>;
}
