//! sdi-ingest - Scanned document ingestion
//!
//! Subcommands:
//! - `ingest`: one ingestion run over the storage root's input area
//! - `build-folders <sheet>`: create one folder path per header-less row
//! - `build-matrix <sheet>`: create one folder path per record
//!
//! Artifacts routed to ERROR are outcomes, not process failures: the exit
//! code is non-zero only when the run cannot start.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdi_common::config::load_config_file;
use sdi_ingest::config::ConfigOverrides;
use sdi_ingest::repository::ContentRepository;
use sdi_ingest::services::{CsvTabularReader, TabularReader};
use sdi_ingest::{FolderStructureBuilder, IngestConfig, IngestionOrchestrator};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sdi-ingest
#[derive(Parser, Debug)]
#[command(name = "sdi-ingest")]
#[command(about = "Ingest scanned documents into a content repository")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(long, global = true, env = "SDI_CONFIG")]
    config: Option<PathBuf>,

    /// Local storage root (input, result and log directories)
    #[arg(long, global = true, env = "SDI_STORAGE_ROOT")]
    storage_root: Option<PathBuf>,

    /// Content repository base URL
    #[arg(long, global = true, env = "SDI_REPOSITORY_URL")]
    repository_url: Option<String>,

    /// Repository user
    #[arg(long, global = true, env = "SDI_USERNAME")]
    username: Option<String>,

    /// Repository password
    #[arg(long, global = true, env = "SDI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Folder node documents are filed under
    #[arg(long, global = true, env = "SDI_INGEST_ROOT_NODE")]
    ingest_root_node: Option<String>,

    /// Folder node the structure builders work under
    #[arg(long, global = true, env = "SDI_STRUCTURE_ROOT_NODE")]
    structure_root_node: Option<String>,

    /// Log filter when RUST_LOG is unset (e.g. `info`, `sdi_ingest=debug`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion pass
    Ingest {
        /// Only list artifacts and their metadata pairing
        #[arg(long)]
        dry_run_scan: bool,
    },
    /// Create folders from a header-less sheet, one path per row
    BuildFolders {
        sheet: PathBuf,
    },
    /// Create folders from a header sheet, one path per record
    BuildMatrix {
        sheet: PathBuf,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            storage_root: self.storage_root.clone(),
            base_url: self.repository_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ingest_root_node: self.ingest_root_node.clone(),
            structure_root_node: self.structure_root_node.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env; a missing file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            return Err(e).context("Failed to parse .env file");
        }
    }

    let args = Args::parse();

    let toml_config =
        load_config_file(args.config.as_deref()).context("Failed to load config file")?;
    let config = IngestConfig::resolve(args.overrides(), toml_config)
        .context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting sdi-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Storage root: {}", config.storage_root.display());

    let reader: Arc<dyn TabularReader> =
        Arc::new(CsvTabularReader::for_extension(&config.layout.metadata_extension));

    match args.command {
        Command::Ingest { dry_run_scan } => {
            let repository = repository(&config)?;
            let orchestrator = IngestionOrchestrator::new(&config, repository, reader)
                .context("Failed to initialize ingestion")?;

            if dry_run_scan {
                print_json(&orchestrator.dry_run_scan()?)?;
            } else {
                print_json(&orchestrator.run().await?)?;
            }
        }
        Command::BuildFolders { sheet } => {
            let builder = structure_builder(&config, reader)?;
            print_json(&builder.build_folders(&sheet).await?)?;
        }
        Command::BuildMatrix { sheet } => {
            let builder = structure_builder(&config, reader)?;
            print_json(&builder.build_matrix(&sheet).await?)?;
        }
    }

    Ok(())
}

fn repository(config: &IngestConfig) -> Result<Arc<dyn ContentRepository>> {
    let client = config
        .repository_client()
        .context("Failed to create repository client")?;
    Ok(Arc::new(client))
}

fn structure_builder(
    config: &IngestConfig,
    reader: Arc<dyn TabularReader>,
) -> Result<FolderStructureBuilder> {
    FolderStructureBuilder::new(config, repository(config)?, reader)
        .context("Failed to initialize structure builder")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
