//! Typed REST client for the Google Drive v3 API.

use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ServiceAccountKey, TokenProvider};
use crate::error::DriveError;
use crate::gallery::{ImageContent, ImageFile, ImageSource, ImageVariant};

/// Default Google API endpoint. Overridable for tests against a local mock.
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com";

/// Fixed page size for folder listings; the proxy does not paginate.
pub const LIST_PAGE_SIZE: u32 = 100;

const USER_AGENT: &str = concat!("gdrive-proxy/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileList {
    files: Vec<ImageFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ThumbnailInfo {
    thumbnail_link: Option<String>,
}

/// Authenticated Drive client.
///
/// One instance is built at startup and shared read-only across all request
/// handlers; the only interior state is the token cache, which is lock-guarded
/// inside [`TokenProvider`]. reqwest pools connections internally.
pub struct DriveClient {
    http: reqwest::Client,
    token: TokenProvider,
    endpoint: String,
}

impl DriveClient {
    /// Create a client against the public Google API endpoint.
    pub fn new(key: ServiceAccountKey) -> Result<Self, DriveError> {
        Self::with_endpoint(key, DEFAULT_DRIVE_ENDPOINT)
    }

    /// Create a client against a custom endpoint (local mock servers,
    /// integration tests).
    pub fn with_endpoint(
        key: ServiceAccountKey,
        endpoint: impl Into<String>,
    ) -> Result<Self, DriveError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        let token = TokenProvider::new(key, http.clone())?;

        Ok(Self {
            http,
            token,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Force a token exchange to prove the credential works.
    ///
    /// Called once at startup so a bad key fails the process instead of the
    /// first request.
    pub async fn verify_credentials(&self) -> Result<(), DriveError> {
        self.token.access_token().await.map(|_| ())
    }

    async fn authorized_get(&self, url: &str) -> Result<reqwest::RequestBuilder, DriveError> {
        let token = self.token.access_token().await?;
        Ok(self.http.get(url).bearer_auth(token))
    }

    /// Translate a non-success Drive status into a [`DriveError`].
    async fn error_for_status(response: reqwest::Response) -> DriveError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = if body.is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, body.chars().take(256).collect::<String>())
        };

        match status.as_u16() {
            404 => DriveError::NotFound(detail),
            401 | 403 => DriveError::Forbidden(detail),
            _ => DriveError::Api(detail),
        }
    }

    /// Stream a media URL, relaying bytes as they arrive.
    async fn stream_media(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<ImageContent, DriveError> {
        let response = request
            .send()
            .await
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .bytes_stream()
            .map_err(|e| DriveError::Transport(e.to_string()))
            .boxed();

        Ok(ImageContent { content_type, body })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!(
            "{}/drive/v3/files/{}",
            self.endpoint,
            urlencoding::encode(file_id)
        )
    }

    /// Fetch the provider-generated thumbnail for a file.
    ///
    /// Drive exposes thumbnails as a short-lived unauthenticated link in the
    /// file metadata. Files without one (e.g. freshly uploaded) fall back to
    /// the original media.
    async fn fetch_thumbnail(&self, file_id: &str) -> Result<ImageContent, DriveError> {
        let url = self.file_url(file_id);
        let response = self
            .authorized_get(&url)
            .await?
            .query(&[("fields", "thumbnailLink")])
            .send()
            .await
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let info: ThumbnailInfo = response
            .json()
            .await
            .map_err(|e| DriveError::Api(format!("malformed file metadata: {}", e)))?;

        match info.thumbnail_link {
            Some(link) => {
                debug!(file_id = file_id, "Serving provider thumbnail");
                self.stream_media(self.http.get(&link)).await
            }
            None => {
                debug!(file_id = file_id, "No thumbnail link, serving original");
                self.fetch_original(file_id).await
            }
        }
    }

    async fn fetch_original(&self, file_id: &str) -> Result<ImageContent, DriveError> {
        let url = self.file_url(file_id);
        let request = self
            .authorized_get(&url)
            .await?
            .query(&[("alt", "media")]);
        self.stream_media(request).await
    }
}

#[async_trait::async_trait]
impl ImageSource for DriveClient {
    /// List non-trashed image files whose parent is `folder_id`.
    ///
    /// One page of at most [`LIST_PAGE_SIZE`] entries, newest creation time
    /// first, restricted to the fields the listing response needs.
    #[instrument(skip(self))]
    async fn list_images(&self, folder_id: &str) -> Result<Vec<ImageFile>, DriveError> {
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            folder_id
        );

        let url = format!("{}/drive/v3/files", self.endpoint);
        let page_size = LIST_PAGE_SIZE.to_string();
        let response = self
            .authorized_get(&url)
            .await?
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, mimeType, size, createdTime)"),
                ("pageSize", page_size.as_str()),
                ("orderBy", "createdTime desc"),
            ])
            .send()
            .await
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| DriveError::Api(format!("malformed file list: {}", e)))?;

        Ok(list.files)
    }

    #[instrument(skip(self))]
    async fn fetch_image(
        &self,
        file_id: &str,
        variant: ImageVariant,
    ) -> Result<ImageContent, DriveError> {
        match variant {
            ImageVariant::Original => self.fetch_original(file_id).await,
            ImageVariant::Thumbnail => self.fetch_thumbnail(file_id).await,
        }
    }
}
