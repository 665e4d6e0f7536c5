use anyhow::{bail, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect all files under `root` (recursively) whose file name matches the
/// given glob pattern, case-insensitively. Traversal order is preserved.
/// An empty directory yields an empty list, not an error. Readability is not
/// checked here; a file that later fails to open is reported by the batch.
pub fn collect_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Import root does not exist: {}", root.display());
    }

    let matcher = file_matcher(pattern)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

fn file_matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()?
        .compile_matcher())
}
