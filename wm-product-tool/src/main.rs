//! wm-product-tool - inspect and edit product documents from the command line
//!
//! Relative document paths that do not exist in the working directory are
//! looked up in the products folder.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wm_storage::config::{self, StorageConfig};
use wm_storage::{CopyMode, EventBus, ParameterSetLoader};

mod commands;

const VERSION_BANNER: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " [",
    env!("GIT_HASH"),
    "] built ",
    env!("BUILD_TIMESTAMP"),
    " (",
    env!("BUILD_PROFILE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "wm-product-tool")]
#[command(about = "Inspect and edit WeldMaster product documents")]
#[command(version = VERSION_BANNER)]
struct Args {
    /// Storage config file
    #[arg(long, env = "WM_STORAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the product documents
    #[arg(long, env = "WM_PRODUCTS_DIR")]
    products_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the seam tree of a product
    Show { file: PathBuf },

    /// Write a copy of a product
    Duplicate {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Give the copy and all its children fresh ids
        #[arg(long)]
        different_ids: bool,
    },

    /// Copy a seam to the end of a series
    CopySeam {
        file: PathBuf,
        #[arg(long)]
        seam: Uuid,
        /// Target series number, defaults to the seam's own series
        #[arg(long)]
        series: Option<i32>,
        #[arg(long)]
        different_ids: bool,
    },

    /// Add a linked seam under a numeric label
    Link {
        file: PathBuf,
        #[arg(long)]
        seam: Uuid,
        #[arg(long)]
        label: String,
    },

    /// Drop filter parameter sets no measure task uses
    Prune { file: PathBuf },

    /// Rewrite a product with current keys
    Normalize {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn copy_mode(different_ids: bool) -> CopyMode {
    if different_ids {
        CopyMode::WithDifferentIds
    } else {
        CopyMode::Identical
    }
}

fn init_tracing(config: &StorageConfig) -> Result<()> {
    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn resolve_document(file: &Path, products_dir: &Path) -> PathBuf {
    if file.is_relative() && !file.exists() {
        products_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn print_changes(changes: &[serde_json::Value]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(changes)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = StorageConfig::load(args.config.as_deref());
    init_tracing(&config)?;

    info!("Starting WeldMaster Product Tool (wm-product-tool) v{}", VERSION_BANNER);

    let products_dir = config::resolve_products_dir(args.products_dir.as_deref(), &config);
    debug!("Products folder: {}", products_dir.display());

    let bus = EventBus::new(config.events.capacity);
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => debug!(?event, "storage event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "storage events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    match args.command {
        Command::Show { file } => {
            let path = resolve_document(&file, &products_dir);
            let product = commands::load(&path, Some(&bus))?;
            print!("{}", commands::show(&product));
        }
        Command::Duplicate {
            file,
            output,
            different_ids,
        } => {
            let path = resolve_document(&file, &products_dir);
            let copy = commands::duplicate(&path, &output, copy_mode(different_ids), Some(&bus))?;
            println!("{}", copy.uuid());
        }
        Command::CopySeam {
            file,
            seam,
            series,
            different_ids,
        } => {
            let path = resolve_document(&file, &products_dir);
            let mut product = commands::load(&path, Some(&bus))?;
            let changes = commands::copy_seam(&mut product, &seam, series, copy_mode(different_ids))?;
            product.save_in_place()?;
            print_changes(&changes)?;
        }
        Command::Link { file, seam, label } => {
            let path = resolve_document(&file, &products_dir);
            let mut product = commands::load(&path, Some(&bus))?;
            let changes = commands::link_seam(&mut product, &seam, &label)?;
            product.save_in_place()?;
            print_changes(&changes)?;
        }
        Command::Prune { file } => {
            let path = resolve_document(&file, &products_dir);
            let loader = ParameterSetLoader::new(config.loader.channel_capacity);
            let removed = commands::prune(&path, &loader, Some(&bus)).await?;
            println!("Removed {} unused filter parameter sets", removed);
        }
        Command::Normalize { file, output } => {
            let path = resolve_document(&file, &products_dir);
            commands::normalize(&path, output.as_deref(), Some(&bus))?;
        }
    }

    Ok(())
}
