use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub frequency: FrequencyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Base folder for rasterized pages and extracted embedded images.
    #[serde(default = "default_image_folder")]
    pub image_folder: PathBuf,

    /// Create one image subfolder per source file.
    #[serde(default = "default_true")]
    pub create_subfolders: bool,

    /// Persist embedded raster images found in the text layer.
    #[serde(default)]
    pub save_images: bool,

    /// Rasterization resolution in DPI for the OCR fallback.
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Raster file format for temporary page images: png, tiff, or jpeg.
    #[serde(default = "default_image_format")]
    pub image_format: String,

    /// Tesseract language code.
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            image_folder: default_image_folder(),
            create_subfolders: true,
            save_images: false,
            resolution: default_resolution(),
            image_format: default_image_format(),
            ocr_language: default_ocr_language(),
        }
    }
}

fn default_image_folder() -> PathBuf {
    PathBuf::from("./data/img")
}
fn default_true() -> bool {
    true
}
fn default_resolution() -> u32 {
    600
}
fn default_image_format() -> String {
    "png".to_string()
}
fn default_ocr_language() -> String {
    "deu".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrequencyConfig {
    /// Stopword file, one word per line, `#` starts a comment line.
    #[serde(default)]
    pub stopwords: Option<PathBuf>,

    /// Tokens shorter than this are dropped.
    #[serde(default = "default_min_word_len")]
    pub min_word_len: usize,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            stopwords: None,
            min_word_len: default_min_word_len(),
        }
    }
}

fn default_min_word_len() -> usize {
    2
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if !(72..=1200).contains(&config.import.resolution) {
        anyhow::bail!("import.resolution must be in [72, 1200] DPI");
    }

    match config.import.image_format.as_str() {
        "png" | "tiff" | "jpeg" => {}
        other => anyhow::bail!(
            "Unknown image format: '{}'. Must be png, tiff, or jpeg.",
            other
        ),
    }

    if config.import.ocr_language.is_empty() {
        anyhow::bail!("import.ocr_language must not be empty");
    }

    if config.frequency.min_word_len == 0 {
        anyhow::bail!("frequency.min_word_len must be >= 1");
    }

    Ok(config)
}
