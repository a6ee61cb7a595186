//! Cover importer CLI application.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use cover_importer::{
    CatalogClient, HttpSession, MalSource, MangadexSource, Pipeline, SourceAdapter,
};
use shared::Config;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// Every volume cover from the Mangadex covers page
    Mangadex,
    /// A single cover from the MyAnimeList detail page
    Mal,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Site to import covers from
    #[arg(value_enum, required_unless_present = "write_config")]
    source: Option<Source>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Download covers but do not upload or update anything
    #[arg(long)]
    dry_run: bool,

    /// Only process the item with this key
    #[arg(long)]
    item: Option<String>,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.write_config {
        Config::default().save(path)?;
        println!("Default configuration written to {}", path.display());
        return Ok(());
    }
    let source = args
        .source
        .ok_or_else(|| anyhow!("A source is required unless --write-config is given"))?;

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config = shared::LogConfig::from_settings("cover-importer", &config.logging);
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("Cover importer starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    // One session for the whole run, shared by the catalog client
    let session = HttpSession::new(&config.http).context("Failed to create HTTP session")?;
    let catalog = CatalogClient::new(session.client(), &config.catalog.base_url)
        .context("Failed to create catalog client")?;

    let source: Box<dyn SourceAdapter> = match source {
        Source::Mangadex => Box::new(MangadexSource::from_config(&config.mangadex)),
        Source::Mal => Box::new(
            MalSource::from_config(&config.mal).context("Failed to configure MAL source")?,
        ),
    };

    let pipeline = Pipeline::new(&catalog, &session, source.as_ref()).dry_run(args.dry_run);
    let stats = match &args.item {
        Some(key) => pipeline.run_item(key).await,
        None => pipeline.run().await,
    }
    .context("Cover import failed")?;

    // Display final statistics
    info!("=== Import Complete ===");
    info!("Items: {}", stats.total_items);
    info!("Skipped: {}", stats.skipped);
    info!("Updated: {}", stats.updated);
    info!("No covers found: {}", stats.no_covers);
    info!("Failed: {}", stats.failed);
    if args.dry_run {
        info!("Would update: {}", stats.would_update);
    }
    info!("Blobs uploaded: {}", stats.blobs_uploaded);

    Ok(())
}
