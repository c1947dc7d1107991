//! Google Drive provider layer.
//!
//! Three pieces, wired together by [`DriveClient`]:
//!
//! - [`ServiceAccountKey`] - credential loading (inline JSON or key file)
//! - [`TokenProvider`] - RS256 JWT-bearer exchange with a cached bearer token
//! - [`DriveClient`] - the Drive v3 REST calls (listing, media, thumbnails)
//!
//! The client implements [`crate::gallery::ImageSource`], which is the only
//! surface the rest of the crate sees.

mod client;
mod credentials;
mod token;

pub use client::{DriveClient, DEFAULT_DRIVE_ENDPOINT, LIST_PAGE_SIZE};
pub use credentials::ServiceAccountKey;
pub use token::{TokenProvider, DRIVE_SCOPE};
