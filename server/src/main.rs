//! tankview server: wires configuration, credentials, the drive client
//! and the HTTP surfaces together.

mod error;
mod handlers;
mod range;
mod state;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use bridge_reqwest::ReqwestTransport;
use bridge_traits::storage::StorageClient;
use core_auth::{credential::DRIVE_READONLY_SCOPE, CredentialProvider, ServiceAccountKey};
use core_catalog::AssetResolver;
use core_diagnostics::AccessDiagnostics;
use core_runtime::{init_logging, Config, LoggingConfig};
use core_stream::{StreamConfig, StreamProxy};
use provider_drive::DriveClient;
use state::{AppState, SharedState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/assets", get(handlers::list_assets))
        .route("/assets/{id}/content", get(handlers::stream_asset))
        .route("/diagnostics", get(handlers::diagnostics))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Fail fast: configuration and key material are validated before any
    // socket is bound or network call is made.
    let config = Config::from_env().context("loading configuration")?;
    init_logging(LoggingConfig::default().with_filter(config.log_filter.clone()))
        .context("initializing logging")?;

    let key = ServiceAccountKey::from_file(
        &config.service_account_file,
        vec![DRIVE_READONLY_SCOPE.to_string()],
    )
    .context("loading service-account key")?;
    info!(identity = %key.client_email, "Service identity loaded");

    let transport = Arc::new(ReqwestTransport::new());
    let credentials = Arc::new(CredentialProvider::new(key, transport.clone()));
    let storage: Arc<dyn StorageClient> =
        Arc::new(DriveClient::new(transport, credentials.clone()));

    let shutdown = CancellationToken::new();

    let state: SharedState = Arc::new(AppState {
        resolver: Arc::new(AssetResolver::new(
            storage.clone(),
            config.video_mime_types.clone(),
            config.max_depth,
            config.list_concurrency,
        )),
        proxy: Arc::new(StreamProxy::new(
            storage.clone(),
            StreamConfig {
                chunk_size: config.chunk_size_bytes,
                ..StreamConfig::default()
            },
        )),
        diagnostics: Arc::new(AccessDiagnostics::new(
            credentials,
            storage,
            config.target_folder_id.clone(),
        )),
        target_folder_id: config.target_folder_id.clone(),
        shutdown: shutdown.clone(),
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "tankview serving");

    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            ctrl_c_shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serving HTTP")?;

    Ok(())
}
