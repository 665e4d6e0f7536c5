//! Collision-free file naming for rasterized pages and extracted images.

use anyhow::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Build a non-existing path inside `dir` for an artifact derived from
/// `src_name`. The name carries the source stem, an optional prefixed page
/// number, and a random component which is re-rolled until the candidate
/// does not exist on disk.
pub fn unique_image_path(
    dir: &Path,
    src_name: &Path,
    number: Option<usize>,
    number_prefix: &str,
    ext: &str,
) -> PathBuf {
    let stem = src_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let number_part = match number {
        Some(n) => format!("_{}{}", number_prefix, n),
        None => String::new(),
    };
    let ext = ext.trim_start_matches('.');

    unique_path_with(dir, || {
        format!("{}{}_{}.{}", stem, number_part, Uuid::new_v4().simple(), ext)
    })
}

/// Re-roll `generate` until the produced name does not collide with an
/// existing file in `dir`.
fn unique_path_with(dir: &Path, mut generate: impl FnMut() -> String) -> PathBuf {
    loop {
        let candidate = dir.join(generate());
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Derive the folder where images for `src_name` are stored, optionally as
/// a per-source-file subfolder, and create it if requested. Creation is
/// implicit on first use: callers pass `create = true` before writing.
pub fn image_folder(
    base: &Path,
    src_name: &Path,
    as_subfolder: bool,
    create: bool,
) -> Result<PathBuf> {
    let folder = if as_subfolder {
        match src_name.file_stem() {
            Some(stem) => base.join(stem),
            None => base.to_path_buf(),
        }
    } else {
        base.to_path_buf()
    };

    if create && !folder.is_dir() {
        std::fs::create_dir_all(&folder)?;
    }

    Ok(folder)
}

/// File extension for an embedded image stream, from its magic number.
pub fn image_ext_for_magic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xff, 0xd8]) {
        Some("jpeg")
    } else if bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]) {
        Some("png")
    } else if bytes.starts_with(b"GIF8") {
        Some("gif")
    } else if bytes.starts_with(b"BM") {
        Some("bmp")
    } else {
        None
    }
}
