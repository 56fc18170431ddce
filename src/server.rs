//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, service wiring and the Axum server lifecycle.

use crate::application::services::{AuthService, ShortenerService};
use crate::config::Config;
use crate::infrastructure::persistence::open_repository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The storage backend (PostgreSQL with migrations, file or memory)
/// - Shortener and owner token services
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Storage cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = open_repository(&config).await?;

    let shortener = ShortenerService::new(
        repository,
        Arc::new(RandomCodeGenerator::new(config.code_length)),
        config.deletion_settings(),
    );
    let auth = AuthService::new(config.token_signing_secret.clone());

    let state = AppState::new(
        Arc::new(shortener),
        Arc::new(auth),
        &config.base_url,
        config.trusted_subnet,
    );

    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
