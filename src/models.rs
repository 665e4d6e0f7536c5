//! Core data types flowing through the ingestion pipeline.

use std::path::Path;

/// File type of a collected source, determined once at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
}

impl SourceKind {
    /// Case-insensitive dispatch on the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(SourceKind::Pdf),
            _ => None,
        }
    }
}

/// How a page's text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PageProvenance {
    /// The OCR fallback was taken, whether or not it recognized anything.
    Ocr,
    /// At least one text run was captured directly from the text layer.
    Text,
}

impl PageProvenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageProvenance::Ocr => "OCR",
            PageProvenance::Text => "Text",
        }
    }
}

/// Per-page extraction result, held only while one document is processed.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub index: usize,
    pub text: String,
    pub provenance: PageProvenance,
}

/// Natural key for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub content_name: String,
    pub filecreated_date: String,
}

/// The persisted unit. Written once, never updated by this pipeline.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub content_name: String,
    pub content_url: String,
    pub filecreated_date: String,
    pub filemodified_date: String,
    pub imported_date: String,
    pub content_source: String,
    pub content: String,
}

impl DocumentRecord {
    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            content_name: self.content_name.clone(),
            filecreated_date: self.filecreated_date.clone(),
        }
    }
}

/// Terminal state of one file's import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// First-time success; a new record exists in the store.
    Imported,
    /// A record with the same natural key already existed.
    SkippedDuplicate,
    /// The source file could not be opened or parsed.
    FailedOpen,
    /// Extraction ran but nothing was stored (empty content, or the store
    /// rejected the insert).
    NotStored,
}

/// Per-batch counters. `imported` is the success count of record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u64,
    pub duplicates: u64,
    pub failed: u64,
    pub not_stored: u64,
    pub unsupported: u64,
}

/// Pipe-joined set of distinct provenance tags, OCR before Text.
pub fn content_source(pages: &[PageResult]) -> String {
    let mut tags: Vec<PageProvenance> = Vec::new();
    for page in pages {
        if !tags.contains(&page.provenance) {
            tags.push(page.provenance);
        }
    }
    tags.sort();
    tags.iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// All non-empty page texts, ascending page order, newline-joined.
pub fn joined_content(pages: &[PageResult]) -> String {
    pages
        .iter()
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
