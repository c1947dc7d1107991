//! Gallery service: folder listings and image fetches.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{DriveError, ListError};
use crate::gallery::{extract_folder_id, ImageContent, ImageFile, ImageSource, ImageVariant};

/// Path prefix under which listed files are served back to the caller.
const FILES_PATH_PREFIX: &str = "/files";

/// One image entry in a folder listing, shaped for the wire.
///
/// `url` and `thumbnail_url` point back at this proxy's file-serving
/// endpoint, never directly at Drive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: String,
    pub created_time: String,
    pub url: String,
    pub thumbnail_url: String,
}

impl ImageEntry {
    /// Shape a provider file record into an entry.
    ///
    /// Every field is required. A record missing any of them fails with
    /// [`ListError::IncompleteEntry`], which fails the whole listing; entries
    /// are never silently dropped.
    pub fn from_file(file: ImageFile) -> Result<Self, ListError> {
        let id = match file.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(ListError::IncompleteEntry {
                    file_id: String::new(),
                    field: "id",
                })
            }
        };

        let name = require_field(&id, "name", file.name)?;
        let mime_type = require_field(&id, "mimeType", file.mime_type)?;
        let size = require_field(&id, "size", file.size)?;
        let created_time = require_field(&id, "createdTime", file.created_time)?;

        let url = format!("{}/{}", FILES_PATH_PREFIX, id);
        let thumbnail_url = format!("{}?size=thumbnail", url);

        Ok(Self {
            id,
            name,
            mime_type,
            size,
            created_time,
            url,
            thumbnail_url,
        })
    }
}

fn require_field(
    file_id: &str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ListError> {
    value.ok_or_else(|| ListError::IncompleteEntry {
        file_id: file_id.to_string(),
        field,
    })
}

/// A successful folder listing.
#[derive(Debug, Clone)]
pub struct Listing {
    /// The canonical folder identifier the reference resolved to
    pub folder_id: String,

    /// Image entries in provider order (newest creation time first)
    pub images: Vec<ImageEntry>,
}

/// Orchestrates folder-reference resolution, provider queries and response
/// shaping over an [`ImageSource`].
///
/// The service is cheap to clone and shared across request handlers.
pub struct GalleryService<S: ImageSource> {
    source: Arc<S>,
}

impl<S: ImageSource> GalleryService<S> {
    /// Create a new gallery service over the given image source.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// List the images inside a folder reference.
    ///
    /// The reference may be a full Drive URL, a URL with an `id=` parameter,
    /// or a bare folder ID. Provider failures are translated by the caller's
    /// error mapping; they never propagate past the HTTP handler.
    pub async fn list_images(&self, folder_ref: &str) -> Result<Listing, ListError> {
        if folder_ref.is_empty() {
            return Err(ListError::MissingFolderRef);
        }

        let folder_id = extract_folder_id(folder_ref).ok_or_else(|| ListError::InvalidFolderRef {
            input: folder_ref.to_string(),
        })?;

        debug!(folder_id = folder_id, "Resolved folder reference");

        let files = self.source.list_images(folder_id).await?;

        let images = files
            .into_iter()
            .map(ImageEntry::from_file)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            folder_id = folder_id,
            count = images.len(),
            "Listed folder images"
        );

        Ok(Listing {
            folder_id: folder_id.to_string(),
            images,
        })
    }

    /// Fetch one file's bytes in the requested variant.
    pub async fn fetch_image(
        &self,
        file_id: &str,
        variant: ImageVariant,
    ) -> Result<ImageContent, DriveError> {
        self.source.fetch_image(file_id, variant).await
    }
}

impl<S: ImageSource> Clone for GalleryService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
