//! CLI administration tool for urlcut.
//!
//! Talks to the configured storage backend directly, without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # View statistics
//! cargo run --bin urlcut-admin -- stats
//!
//! # Check storage liveness
//! cargo run --bin urlcut-admin -- ping
//!
//! # Look up a short code
//! cargo run --bin urlcut-admin -- resolve Ab3dE6gH
//!
//! # List an owner's links
//! cargo run --bin urlcut-admin -- urls 5f2b0c...
//!
//! # Delete some of an owner's links
//! cargo run --bin urlcut-admin -- delete 5f2b0c... Ab3dE6gH Zz9yX8wV
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_DSN`, `FILE_STORAGE_PATH`, `CONFIG` and
//! `TOKEN_SIGNING_SECRET`. Note that the memory backend starts empty.

use urlcut::config;
use urlcut::domain::deletion_request::DeletionRequest;
use urlcut::domain::deletion_worker::{DeletionSettings, run_deletion};
use urlcut::domain::error::StorageError;
use urlcut::domain::repositories::UrlRepository;
use urlcut::infrastructure::persistence::open_repository;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// CLI tool for managing urlcut storage.
#[derive(Parser)]
#[command(name = "urlcut-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics
    Stats,

    /// Check storage liveness
    Ping,

    /// Print the original URL behind a short code
    Resolve {
        /// Short code, without the base URL
        code: String,
    },

    /// List an owner's live links
    Urls {
        /// Owner id, the part of the token before the dot
        owner_id: String,
    },

    /// Soft-delete an owner's links and wait for completion
    Delete {
        owner_id: String,

        /// Short codes to delete
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let repo = open_repository(&config).await?;

    println!(
        "{} {}",
        "Storage:".bright_black(),
        repo.backend_name().bright_white()
    );
    println!();

    match cli.command {
        Commands::Stats => handle_stats(repo.as_ref()).await?,
        Commands::Ping => handle_ping(repo.as_ref()).await?,
        Commands::Resolve { code } => handle_resolve(repo.as_ref(), &code).await?,
        Commands::Urls { owner_id } => handle_urls(repo.as_ref(), &owner_id).await?,
        Commands::Delete { owner_id, codes } => {
            handle_delete(repo, config.deletion_settings(), owner_id, codes).await?
        }
    }

    Ok(())
}

/// Displays live link and owner counts.
async fn handle_stats(repo: &dyn UrlRepository) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let stats = repo.stats().await?;

    println!(
        "  URLs:   {}",
        stats.url_count.to_string().bright_green().bold()
    );
    println!(
        "  Owners: {}",
        stats.user_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

async fn handle_ping(repo: &dyn UrlRepository) -> Result<()> {
    println!("{}", "Checking storage...".bright_blue());

    repo.ping().await?;

    println!("{}", "Storage OK".green().bold());
    Ok(())
}

async fn handle_resolve(repo: &dyn UrlRepository, code: &str) -> Result<()> {
    match repo.get_original_url(code).await {
        Ok(url) => println!("  {} -> {}", code.cyan(), url.bright_white()),
        Err(StorageError::NotFound(_)) => println!("  {} {}", code.cyan(), "not found".yellow()),
        Err(StorageError::Gone(_)) => println!("  {} {}", code.cyan(), "deleted".red()),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Lists an owner's links as a two-column table.
///
/// ```text
///   Code       Original URL
///   ────────────────────────────────────────────
///   Ab3dE6gH   https://example.com/some/long/path
/// ```
async fn handle_urls(repo: &dyn UrlRepository, owner_id: &str) -> Result<()> {
    println!("{}", "Owner links".bright_blue().bold());
    println!();

    let urls = repo.get_user_urls(owner_id).await?;

    if urls.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {}",
        "Code".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    for item in &urls {
        println!("  {:<10} {}", item.short_code.cyan(), item.original_url);
    }

    println!();
    println!("  Total: {}", urls.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn handle_delete(
    repo: Arc<dyn UrlRepository>,
    settings: DeletionSettings,
    owner_id: String,
    codes: Vec<String>,
) -> Result<()> {
    let count = codes.len();
    println!(
        "{} {} code(s) for {}",
        "Deleting".bright_blue().bold(),
        count,
        owner_id.cyan()
    );

    run_deletion(repo, DeletionRequest::new(owner_id, codes), settings).await;

    println!(
        "{}",
        "Done. Codes not owned by this owner were skipped; see logs for batch failures."
            .green()
    );
    Ok(())
}
