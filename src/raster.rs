//! Single-page rasterization for the OCR fallback.
//!
//! The target page is split off into a standalone single-page PDF in
//! memory, rasterized at the configured resolution with `pdftoppm`
//! (grayscale), lightly blurred to improve OCR accuracy on scanned
//! documents, and written to a collision-free path inside the per-file
//! image folder. All scratch files live in a temporary directory that is
//! removed when the call returns.

use anyhow::{bail, Context, Result};
use image::DynamicImage;
use log::warn;
use lopdf::Document;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::naming;

/// Blur sigma applied before encoding. Light on purpose: heavier blur
/// starts to merge glyphs at 600 DPI.
const BLUR_SIGMA: f32 = 1.0;

/// Rasterize page `page_index` (0-based) of `src` into `dst_folder`.
/// Returns the written image path, or `None` when the source cannot be
/// opened. Rasterizer failures are errors; the caller treats them as an
/// empty-text page.
pub fn rasterize_page(
    src: &Path,
    page_index: usize,
    dst_folder: &Path,
    format: &str,
    resolution: u32,
) -> Result<Option<PathBuf>> {
    let doc = match Document::load(src) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Cannot open '{}' for rasterization: {}", src.display(), e);
            return Ok(None);
        }
    };

    let single_page = split_single_page(doc, page_index)?;

    let scratch = tempfile::tempdir().context("creating rasterizer scratch directory")?;
    let pdf_path = scratch.path().join("page.pdf");
    std::fs::write(&pdf_path, &single_page)?;

    let produced = run_pdftoppm(&pdf_path, scratch.path(), resolution)?;

    let img = image::open(&produced)
        .with_context(|| format!("decoding rasterized page {}", produced.display()))?;
    let gray = image::imageops::blur(&img.to_luma8(), BLUR_SIGMA);

    let out_path = naming::unique_image_path(dst_folder, src, Some(page_index), "p", format);
    DynamicImage::ImageLuma8(gray)
        .save(&out_path)
        .with_context(|| format!("writing page image {}", out_path.display()))?;

    Ok(Some(out_path))
}

/// Copy exactly one page into a fresh in-memory single-page PDF.
fn split_single_page(mut doc: Document, page_index: usize) -> Result<Vec<u8>> {
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let target = match pages.get(page_index) {
        Some(n) => *n,
        None => bail!("page {} out of range ({} pages)", page_index + 1, pages.len()),
    };

    let others: Vec<u32> = pages.into_iter().filter(|n| *n != target).collect();
    doc.delete_pages(&others);
    doc.prune_objects();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn run_pdftoppm(pdf_path: &Path, out_dir: &Path, resolution: u32) -> Result<PathBuf> {
    let prefix = out_dir.join("page");
    let output = Command::new("pdftoppm")
        .arg("-r")
        .arg(resolution.to_string())
        .arg("-gray")
        .arg("-png")
        .arg(pdf_path)
        .arg(&prefix)
        .output()
        .context("running pdftoppm (is poppler installed?)")?;

    if !output.status.success() {
        bail!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    // Single-page input, so exactly one page-*.png appears.
    let produced = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.extension().map(|e| e == "png").unwrap_or(false)
                && path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with("page-"))
                    .unwrap_or(false)
        });

    match produced {
        Some(path) => Ok(path),
        None => bail!("pdftoppm produced no output image"),
    }
}
