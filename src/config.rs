//! Configuration management for the Drive proxy.
//!
//! Supports command-line arguments via clap, environment variables, and
//! sensible defaults for everything optional.
//!
//! # Environment Variables
//!
//! - `GDRIVE_HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 5001)
//! - `GOOGLE_SERVICE_ACCOUNT_KEY` - Inline service-account key JSON
//! - `GOOGLE_SERVICE_ACCOUNT_KEY_PATH` - Path to the key file
//!   (default: ./service-account-key.json; ignored when inline JSON is set)
//! - `GDRIVE_ENDPOINT` - Custom Google API endpoint (for testing)
//! - `GDRIVE_ALLOWED_ORIGIN` - CORS allowed origin (default: *)
//! - `GDRIVE_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)

use clap::Parser;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5001;

/// Default service-account key file path.
pub const DEFAULT_KEY_PATH: &str = "./service-account-key.json";

/// Default CORS allowed origin (wildcard).
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// gdrive-proxy - a thin HTTP proxy for Google Drive image folders.
///
/// Exposes a Drive folder's image listing and file downloads as two REST
/// endpoints, authenticated with a service-account key.
#[derive(Parser, Debug, Clone)]
#[command(name = "gdrive-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GDRIVE_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    // =========================================================================
    // Google Drive Configuration
    // =========================================================================
    /// Service-account key as inline JSON.
    ///
    /// Takes priority over the key file path when set.
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_KEY", hide_env_values = true)]
    pub service_account_key: Option<String>,

    /// Path to the service-account key file.
    #[arg(
        long,
        default_value = DEFAULT_KEY_PATH,
        env = "GOOGLE_SERVICE_ACCOUNT_KEY_PATH"
    )]
    pub service_account_key_path: String,

    /// Custom Google API endpoint URL.
    ///
    /// If not specified, uses the public Google endpoint. Intended for
    /// integration tests against a local mock.
    #[arg(long, env = "GDRIVE_ENDPOINT")]
    pub drive_endpoint: Option<String>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// CORS allowed origin, either "*" or a fixed origin.
    #[arg(long, default_value = DEFAULT_ALLOWED_ORIGIN, env = "GDRIVE_ALLOWED_ORIGIN")]
    pub allowed_origin: String,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds for served images.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "GDRIVE_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        // An inline key that is set but empty is almost certainly a broken
        // deployment; fail loudly rather than falling through to the file.
        if let Some(ref key) = self.service_account_key {
            if key.trim().is_empty() {
                return Err(
                    "GOOGLE_SERVICE_ACCOUNT_KEY is set but empty. \
                     Unset it to use the key file, or provide the key JSON"
                        .to_string(),
                );
            }
        }

        if self.service_account_key_path.is_empty() {
            return Err(
                "Service-account key path is required. \
                 Set --service-account-key-path or GOOGLE_SERVICE_ACCOUNT_KEY_PATH"
                    .to_string(),
            );
        }

        if self.allowed_origin.is_empty() {
            return Err(
                "Allowed origin must be \"*\" or a fixed origin, not empty".to_string(),
            );
        }
        if self.allowed_origin != "*" && self.allowed_origin.parse::<http::HeaderValue>().is_err() {
            return Err(format!(
                "Allowed origin {:?} is not a valid header value",
                self.allowed_origin
            ));
        }

        if let Some(ref endpoint) = self.drive_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Drive endpoint {:?} must be an http(s) URL",
                    endpoint
                ));
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the inline key is the credential source.
    pub fn uses_inline_key(&self) -> bool {
        self.service_account_key.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
