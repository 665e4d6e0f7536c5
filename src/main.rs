//! # Textmill CLI (`tmill`)
//!
//! The `tmill` binary drives the offline PDF ingestion pipeline: database
//! initialization, batch import with page-level OCR fallback, word-frequency
//! reporting, and an external-tool health check.
//!
//! ## Usage
//!
//! ```bash
//! tmill --config ./config/tmill.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tmill init` | Create the SQLite database and run schema migrations |
//! | `tmill import <path>` | Ingest a PDF file or a folder of PDFs |
//! | `tmill stats` | Print the aggregated word-frequency table |
//! | `tmill doctor` | Check external tools (pdftoppm, tesseract) and the database |

mod collect;
mod config;
mod doctor;
mod extract;
mod freq;
mod import;
mod layout;
mod migrate;
mod models;
mod naming;
mod ocr;
mod raster;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::store::IngestionStore;

/// Textmill — an offline PDF ingestion pipeline with OCR fallback and
/// word-frequency reporting.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[db]`, `[import]`, and `[frequency]` sections.
#[derive(Parser)]
#[command(
    name = "tmill",
    about = "Textmill — PDF ingestion with OCR fallback, SQLite document store, and word-frequency reporting",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tmill.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents table with its
    /// natural-key uniqueness constraint. Idempotent.
    Init,

    /// Import a PDF file or a folder of PDFs.
    ///
    /// Walks a folder recursively (case-insensitive `*.pdf` match), runs
    /// the per-file extraction state machine, and stores one record per
    /// document. Duplicates (same basename and creation timestamp) are
    /// skipped; failures are logged and never abort the batch.
    Import {
        /// A PDF file, or a folder to walk recursively.
        path: PathBuf,

        /// Maximum number of files to process.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the aggregated word-frequency table.
    ///
    /// Tokenizes all stored document text, filters stopwords, and prints
    /// the top entries. Each document contributes a cumulative relative
    /// frequency of 1.0.
    Stats {
        /// Number of entries to print.
        #[arg(long, default_value_t = 50)]
        top: usize,
    },

    /// Check external tools and the database.
    ///
    /// The OCR fallback shells out to `pdftoppm` and `tesseract`; this
    /// command reports whether they are on PATH.
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = IngestionStore::open(&cfg).await?;
            migrate::run_migrations(&store).await?;
            store.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Import { path, limit } => {
            let store = IngestionStore::open(&cfg).await?;
            migrate::run_migrations(&store).await?;

            let mut files = if path.is_dir() {
                collect::collect_files(&path, "*.pdf")?
            } else {
                vec![path.clone()]
            };
            if let Some(limit) = limit {
                files.truncate(limit);
            }

            let summary = import::import_files(&store, &files, &cfg.import).await?;
            store.close().await;

            println!("import {}", path.display());
            println!("  files considered: {}", files.len());
            println!("  imported: {}", summary.imported);
            println!("  duplicates skipped: {}", summary.duplicates);
            println!("  failed: {}", summary.failed);
            println!("  not stored: {}", summary.not_stored);
            println!("  unsupported: {}", summary.unsupported);
            println!("ok");
        }
        Commands::Stats { top } => {
            let store = IngestionStore::open(&cfg).await?;
            migrate::run_migrations(&store).await?;

            let documents = store.document_count().await?;
            let freqs = freq::collect_frequencies(&store, &cfg.frequency).await?;
            store.close().await;

            println!("stats ({} documents)", documents);
            if freqs.is_empty() {
                println!("No content.");
            } else {
                for (word, frequency) in freq::ranked(&freqs).into_iter().take(top) {
                    println!("  {:<24} {:.4}", word, frequency);
                }
            }
        }
        Commands::Doctor => {
            doctor::run_doctor(&cfg)?;
        }
    }

    Ok(())
}
