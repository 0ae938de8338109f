//! picpost-admin: maintenance commands that run outside the request path.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use picpost_api::{services::OrphanSweeper, telemetry, AppConfig};
use picpost_core::{detect_content_type, BlobStore};
use picpost_db::{Database, FilesystemBackend};
use picpost_inference::{ImageIndexer, OpenAIBackend};

#[derive(Parser)]
#[command(name = "picpost-admin")]
#[command(author, version, about = "Maintenance tasks for picpost")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate embeddings for catalog records that have none
    Index {
        /// Maximum number of records to process
        #[arg(short, long, default_value_t = 100)]
        limit: i64,
    },

    /// Suggest a caption for a stored image
    Caption {
        /// Stored filename, as it appears in the image URL
        filename: String,
    },

    /// Delete blobs that no catalog record references
    SweepOrphans,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = telemetry::init_tracing(&config);

    match cli.command {
        Commands::Index { limit } => cmd_index(&config, limit).await,
        Commands::Caption { filename } => cmd_caption(&config, &filename).await,
        Commands::SweepOrphans => cmd_sweep(&config).await,
    }
}

fn indexer(config: &AppConfig) -> anyhow::Result<ImageIndexer> {
    let backend_config = config
        .openai
        .backend_config()
        .ok_or_else(|| anyhow!("OPENAI_API_KEY is not set"))?;
    let backend = Arc::new(OpenAIBackend::new(backend_config)?);
    Ok(ImageIndexer::new(backend.clone(), backend))
}

async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    let db = Database::connect_with_config(&config.database_url, config.pool_config())
        .await
        .context("Failed to connect to the catalog database")?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_index(config: &AppConfig, limit: i64) -> anyhow::Result<()> {
    if limit <= 0 {
        return Err(anyhow!("--limit must be positive"));
    }
    let indexer = indexer(config)?;
    let db = connect(config).await?;
    let blobs = FilesystemBackend::new(&config.upload_dir);

    let report = indexer.index_pending(&db.images, &blobs, limit).await?;
    println!(
        "indexed: {}, skipped: {}, failed: {}",
        report.indexed, report.skipped, report.failed
    );
    Ok(())
}

async fn cmd_caption(config: &AppConfig, filename: &str) -> anyhow::Result<()> {
    let indexer = indexer(config)?;
    let blobs = FilesystemBackend::new(&config.upload_dir);

    let bytes = blobs.read(filename).await?;
    let mime_type = detect_content_type(filename, &bytes);
    let caption = indexer.generate_caption(&bytes, &mime_type).await?;
    println!("{}", caption);
    Ok(())
}

async fn cmd_sweep(config: &AppConfig) -> anyhow::Result<()> {
    let db = connect(config).await?;
    let sweeper = OrphanSweeper::new(
        Arc::new(db.images.clone()),
        Arc::new(FilesystemBackend::new(&config.upload_dir)),
        config.orphan_min_age,
    );

    let report = sweeper.sweep().await?;
    println!(
        "scanned: {}, deleted: {}, retained: {}",
        report.scanned, report.deleted, report.retained
    );
    Ok(())
}
