//! Storage backend implementations.
//!
//! # Repositories
//!
//! - [`MemoryUrlRepository`] - In-process maps, nothing persisted
//! - [`FileUrlRepository`] - In-process maps backed by an append-only JSON-lines log
//! - [`PgUrlRepository`] - PostgreSQL table with unique constraints
//!
//! [`open_repository`] picks one from the configuration at startup.

pub mod file_url_repository;
pub mod memory_url_repository;
pub mod pg_url_repository;
pub mod url_index;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use crate::config::{Config, StorageBackend, mask_connection_string};
use crate::domain::repositories::UrlRepository;

/// Builds the storage backend selected by `config`.
///
/// PostgreSQL backends are migrated before they are returned.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail or the
/// storage file cannot be opened.
pub async fn open_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    let repository: Arc<dyn UrlRepository> = match config.storage_backend() {
        StorageBackend::Postgres(dsn) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(&dsn)
                .await
                .with_context(|| {
                    format!("Failed to connect to {}", mask_connection_string(&dsn))
                })?;
            tracing::info!("Connected to database");

            let repository = PgUrlRepository::with_timeout(
                Arc::new(pool),
                Duration::from_secs(config.storage_timeout_seconds),
            );
            repository
                .migrate()
                .await
                .context("Failed to apply migrations")?;
            tracing::info!("Migrations applied");

            Arc::new(repository)
        }
        StorageBackend::File(path) => Arc::new(
            FileUrlRepository::open(&path)
                .await
                .with_context(|| format!("Failed to open storage file {path}"))?,
        ),
        StorageBackend::Memory => Arc::new(MemoryUrlRepository::new()),
    };

    tracing::info!(backend = repository.backend_name(), "Storage ready");
    Ok(repository)
}
