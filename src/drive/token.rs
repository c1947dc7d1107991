//! OAuth2 access-token provider for service accounts.
//!
//! Implements the JWT-bearer exchange: an RS256-signed assertion built from
//! the service-account key is posted to the key's `token_uri` and traded for
//! a short-lived bearer token. Tokens are cached behind an async `RwLock`
//! with double-checked refresh, so concurrent handlers share one exchange.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use super::ServiceAccountKey;
use crate::error::DriveError;

/// OAuth2 scope requested for every token. Read-only: the proxy never
/// mutates anything in Drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Requested assertion lifetime in seconds (Google caps this at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Caching access-token provider for one service account.
pub struct TokenProvider {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider from a parsed service-account key.
    ///
    /// Fails if the key's PEM private key cannot be used for RS256 signing.
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self, DriveError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| DriveError::Credentials(format!("invalid RSA private key: {}", e)))?;

        Ok(Self {
            key,
            signing_key,
            http,
            cached: RwLock::new(None),
        })
    }

    /// Get a valid access token, exchanging a fresh assertion if the cached
    /// one is missing or near expiry.
    pub async fn access_token(&self) -> Result<String, DriveError> {
        // Fast path: shared read of a fresh cached token
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.token.clone());
            }
        }

        // Slow path: re-check under the write lock, then refresh
        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.clone());
        }

        let response = self.exchange().await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);

        debug!(
            expires_in = response.expires_in,
            "Obtained Drive access token"
        );

        *cached = Some(CachedToken {
            token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }

    async fn exchange(&self) -> Result<TokenResponse, DriveError> {
        let assertion = self.sign_assertion()?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::TokenExchange(format!(
                "{} from {}: {}",
                status,
                self.key.token_uri,
                truncate(&body, 256)
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| DriveError::TokenExchange(format!("malformed token response: {}", e)))
    }

    fn sign_assertion(&self) -> Result<String, DriveError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| DriveError::Credentials(format!("failed to sign assertion: {}", e)))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// Tests
// =============================================================================
