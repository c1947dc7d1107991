use thiserror::Error;

/// Errors from the Google Drive provider layer.
///
/// Everything the token exchange, listing and media endpoints can fail with
/// is collapsed into this enum at the client boundary. Nothing from reqwest
/// or jsonwebtoken leaks past it.
#[derive(Debug, Clone, Error)]
pub enum DriveError {
    /// The folder or file does not exist (HTTP 404 from Drive)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The service account is not allowed to read the resource (HTTP 403/401)
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The service-account credential could not be loaded or used for signing
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The OAuth2 token endpoint rejected or failed the JWT-bearer exchange
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Network or protocol failure talking to Google
    #[error("Transport error: {0}")]
    Transport(String),

    /// Drive answered with something the client could not interpret
    #[error("Unexpected Drive response: {0}")]
    Api(String),
}

/// Errors producing a folder listing.
///
/// The first two variants are client input problems detected before any
/// provider call; `IncompleteEntry` is the decided policy for listing entries
/// that come back without a required field (the whole request fails, the
/// caller sees it).
#[derive(Debug, Clone, Error)]
pub enum ListError {
    /// The folderUrl query parameter was missing or empty
    #[error("No folder URL provided")]
    MissingFolderRef,

    /// No folder ID could be extracted from the supplied reference
    #[error("Invalid folder URL: {input}")]
    InvalidFolderRef { input: String },

    /// A listing entry came back without a required metadata field
    #[error("Listing entry {file_id:?} is missing field: {field}")]
    IncompleteEntry {
        file_id: String,
        field: &'static str,
    },

    /// Provider-layer failure
    #[error(transparent)]
    Drive(#[from] DriveError),
}
