//! Per-file extraction state machine.
//!
//! For one PDF: check the store for a duplicate, open and parse, walk the
//! pages in ascending order taking direct extraction or the raster+OCR
//! fallback per page, then fold the page results into a single
//! [`DocumentRecord`] and hand it to the store. All failures are contained
//! at the file level; a bad page degrades to an empty-text page and a bad
//! file never aborts the surrounding batch.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use log::{error, info, warn};
use lopdf::Document;
use std::path::Path;
use std::time::SystemTime;

use crate::config::ImportConfig;
use crate::layout::{self, ImageSink};
use crate::models::{
    content_source, joined_content, DocumentKey, DocumentRecord, ImportOutcome, PageProvenance,
    PageResult,
};
use crate::naming;
use crate::ocr;
use crate::raster;
use crate::store::IngestionStore;

pub async fn import_file(
    store: &IngestionStore,
    path: &Path,
    cfg: &ImportConfig,
) -> Result<ImportOutcome> {
    let (key, filemodified_date) = match identity_key(path) {
        Ok(parts) => parts,
        Err(e) => {
            error!("Cannot stat '{}': {:#}", path.display(), e);
            return Ok(ImportOutcome::FailedOpen);
        }
    };

    // First duplicate check: an existing record short-circuits all
    // page-level work.
    if store.exists(&key).await? {
        warn!(
            "Possible duplicate database entry found; '{}' was not imported ({:?})",
            path.display(),
            key
        );
        return Ok(ImportOutcome::SkippedDuplicate);
    }

    let mut doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            error!("Cannot open '{}': {}", path.display(), e);
            return Ok(ImportOutcome::FailedOpen);
        }
    };

    // Advisory only: an encrypted document may still yield pages via the
    // OCR fallback, so processing proceeds either way.
    if doc.is_encrypted() {
        warn!("Text extraction not allowed in '{}'.", path.display());
        let _ = doc.decrypt("");
    }

    let img_folder = naming::image_folder(
        &cfg.image_folder,
        path,
        cfg.create_subfolders,
        true,
    )?;

    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    let mut pages: Vec<PageResult> = Vec::with_capacity(page_ids.len());

    for (index, page_id) in page_ids.into_iter().enumerate() {
        info!("Extracting text from p. {} of '{}'", index + 1, path.display());

        let sink = ImageSink {
            save_images: cfg.save_images,
            src_path: path,
            page_index: index,
            dst_folder: &img_folder,
        };
        let text = match layout::page_nodes(&doc, page_id) {
            Ok(nodes) => layout::collect_text(&nodes, &sink),
            Err(e) => {
                warn!(
                    "Page {} of '{}' could not be parsed: {}",
                    index + 1,
                    path.display(),
                    e
                );
                String::new()
            }
        };

        if !text.is_empty() {
            pages.push(PageResult {
                index,
                text,
                provenance: PageProvenance::Text,
            });
            continue;
        }

        // No text will come out of an image-only page; try OCR. A failure
        // in rasterization or recognition degrades to an empty-text page.
        info!(
            "Page {} of '{}' had no extractable text. Trying OCR.",
            index + 1,
            path.display()
        );
        let ocr_text = match run_ocr_on_page(path, index, &img_folder, cfg) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "OCR fallback failed on page {} of '{}': {:#}",
                    index + 1,
                    path.display(),
                    e
                );
                String::new()
            }
        };
        pages.push(PageResult {
            index,
            text: ocr_text,
            provenance: PageProvenance::Ocr,
        });
    }

    let content = joined_content(&pages);
    if content.is_empty() {
        warn!("No text recovered from '{}'; nothing stored.", path.display());
        return Ok(ImportOutcome::NotStored);
    }

    let record = DocumentRecord {
        content_name: key.content_name.clone(),
        content_url: path
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        filecreated_date: key.filecreated_date.clone(),
        filemodified_date,
        imported_date: timestamp_string(SystemTime::now()),
        content_source: content_source(&pages),
        content,
    };

    // Second, authoritative check: the store itself guards against a race
    // between the first check and this write.
    if store.insert_if_absent(&record).await? {
        info!("Content for file '{}' stored in database.", path.display());
        Ok(ImportOutcome::Imported)
    } else {
        warn!(
            "Possible duplicate database entry found; '{}' was not imported ({:?})",
            path.display(),
            record.key()
        );
        Ok(ImportOutcome::SkippedDuplicate)
    }
}

/// Rasterize one page and run recognition on it. The rasterized image is
/// consumed (deleted) by the recognition step.
fn run_ocr_on_page(
    path: &Path,
    page_index: usize,
    img_folder: &Path,
    cfg: &ImportConfig,
) -> Result<String> {
    let image = raster::rasterize_page(
        path,
        page_index,
        img_folder,
        &cfg.image_format,
        cfg.resolution,
    )?;
    match image {
        Some(image_path) => Ok(ocr::recognize(&image_path, &cfg.ocr_language)),
        None => Ok(String::new()),
    }
}

/// Natural key plus the modification timestamp, from filesystem metadata.
/// On filesystems without a creation time the modification time
/// substitutes. Copying a file changes its key; the dedup is by where the
/// file sits on disk, not by content.
fn identity_key(path: &Path) -> Result<(DocumentKey, String)> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("reading metadata for {}", path.display()))?;
    let modified = metadata.modified()?;
    let created = metadata.created().unwrap_or(modified);

    let key = DocumentKey {
        content_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        filecreated_date: timestamp_string(created),
    };
    Ok((key, timestamp_string(modified)))
}

fn timestamp_string(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
