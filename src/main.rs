//! gdrive-proxy - a thin HTTP proxy for Google Drive image folders.
//!
//! This binary loads the service-account credential, verifies it against
//! Google, and starts the HTTP server.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gdrive_proxy::{
    config::Config,
    drive::{DriveClient, ServiceAccountKey, DEFAULT_DRIVE_ENDPOINT},
    gallery::GalleryService,
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("gdrive-proxy v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if config.uses_inline_key() {
        info!("  Credential: inline key JSON (GOOGLE_SERVICE_ACCOUNT_KEY)");
    } else {
        info!("  Credential: key file {}", config.service_account_key_path);
    }
    if let Some(ref endpoint) = config.drive_endpoint {
        warn!("  Drive endpoint: {} (non-default)", endpoint);
    }
    if config.allowed_origin == "*" {
        info!("  CORS: any origin");
    } else {
        info!("  CORS: {}", config.allowed_origin);
    }
    info!("  Cache max-age: {}s", config.cache_max_age);

    // Load the service-account key
    let key = match ServiceAccountKey::load(
        config.service_account_key.as_deref(),
        &config.service_account_key_path,
    ) {
        Ok(key) => key,
        Err(e) => {
            error!("Failed to load service-account key: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("  Service account: {}", key.client_email);

    // Build the Drive client
    let endpoint = config
        .drive_endpoint
        .clone()
        .unwrap_or_else(|| DEFAULT_DRIVE_ENDPOINT.to_string());
    let client = match DriveClient::with_endpoint(key, endpoint) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build Drive client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Prove the credential works before serving
    info!("");
    info!("Verifying Google credentials...");
    match client.verify_credentials().await {
        Ok(()) => info!("  Credential accepted"),
        Err(e) => {
            error!("  Credential check failed: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - The service-account key JSON is complete and unmodified");
            error!("    - The key has not been revoked in the Google Cloud console");
            error!("    - Outbound HTTPS to googleapis.com is allowed");
            return ExitCode::FAILURE;
        }
    }

    // Build the gallery service and router
    let gallery = GalleryService::new(client);
    let router_config = RouterConfig::new()
        .with_allowed_origin(config.allowed_origin.clone())
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);
    let router = create_router(gallery, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/api/health", addr);
    info!(
        "    curl 'http://{}/api/gdrive-images?folderUrl=<folder URL or ID>'",
        addr
    );
    info!("    curl http://{}/files/<file_id>", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "gdrive_proxy=debug,tower_http=debug"
    } else {
        "gdrive_proxy=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
