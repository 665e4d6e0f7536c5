//! Batch import driver.
//!
//! Iterates a file list (or a folder via [`crate::collect`]) in input
//! order, runs the per-file extraction state machine, and accumulates a
//! summary. Every per-file condition is logged and contained; a bad file
//! never aborts the batch.

use anyhow::Result;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::collect;
use crate::config::ImportConfig;
use crate::extract;
use crate::models::{ImportOutcome, ImportSummary, SourceKind};
use crate::store::IngestionStore;

pub async fn import_files(
    store: &IngestionStore,
    files: &[PathBuf],
    cfg: &ImportConfig,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for file in files {
        match SourceKind::from_path(file) {
            Some(SourceKind::Pdf) => {
                info!("Processing file: '{}'", file.display());
                match extract::import_file(store, file, cfg).await {
                    Ok(ImportOutcome::Imported) => summary.imported += 1,
                    Ok(ImportOutcome::SkippedDuplicate) => summary.duplicates += 1,
                    Ok(ImportOutcome::FailedOpen) => summary.failed += 1,
                    Ok(ImportOutcome::NotStored) => summary.not_stored += 1,
                    Err(e) => {
                        error!("Import of '{}' failed: {:#}", file.display(), e);
                        summary.failed += 1;
                    }
                }
            }
            None => {
                warn!("'{}' is currently not supported.", file.display());
                summary.unsupported += 1;
            }
        }
    }

    Ok(summary)
}

pub async fn import_folder(
    store: &IngestionStore,
    folder: &Path,
    cfg: &ImportConfig,
) -> Result<ImportSummary> {
    let files = collect::collect_files(folder, "*.pdf")?;
    import_files(store, &files, cfg).await
}
