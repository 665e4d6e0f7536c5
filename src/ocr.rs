//! External OCR invocation.
//!
//! Runs `tesseract` against a previously rasterized page image and reads
//! the recognized text back from the `.txt` artifact tesseract writes.
//! Both the artifact and the input image are removed before returning, on
//! every path: a page with no recognizable text is valid, not an error.

use log::warn;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Recognize text in `image_path`. Returns the empty string when
/// recognition produces no output. The input image and the recognition
/// artifact do not survive this call.
pub fn recognize(image_path: &Path, language: &str) -> String {
    let output_base = image_path.with_extension("");
    let text = run_tesseract(image_path, &output_base, language);

    let artifact = output_base.with_extension("txt");
    remove_quietly(&artifact);
    remove_quietly(image_path);

    // Tesseract pads its output with a trailing form feed; a page where it
    // recognized only whitespace counts as no output.
    text.map(|t| t.trim().to_string()).unwrap_or_default()
}

fn run_tesseract(image_path: &Path, output_base: &Path, language: &str) -> Option<String> {
    let output = match Command::new("tesseract")
        .arg(image_path)
        .arg(output_base)
        .arg("-l")
        .arg(language)
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("tesseract failed to start: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "tesseract failed on '{}': {}",
            image_path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let artifact = output_base.with_extension("txt");
    match std::fs::read_to_string(&artifact) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                "tesseract produced no readable output for '{}': {}",
                image_path.display(),
                e
            );
            None
        }
    }
}

fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove temporary file '{}': {}", path.display(), e);
        }
    }
}

/// The artifact path tesseract writes for a given image, exposed for the
/// cleanup assertions in tests.
pub fn artifact_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}
