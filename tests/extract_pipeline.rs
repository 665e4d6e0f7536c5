//! Pipeline tests against an in-memory store: per-file extraction,
//! provenance tagging, duplicate handling, and batch summaries.
//!
//! Pages without a text layer exercise the OCR fallback. Whether or not
//! pdftoppm and tesseract are installed, a blank page yields no text, so
//! the assertions hold on hosts with and without the tools.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use sqlx::Row;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use textmill::config::ImportConfig;
use textmill::extract;
use textmill::import;
use textmill::migrate;
use textmill::models::ImportOutcome;
use textmill::store::IngestionStore;

/// One page per entry; an empty entry produces a page with no text layer.
fn build_pdf(pages_text: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages_text {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
        ];
        if !text.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn write_pdf(dir: &Path, name: &str, pages_text: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, build_pdf(pages_text)).unwrap();
    path
}

fn test_config(tmp: &TempDir) -> ImportConfig {
    ImportConfig {
        image_folder: tmp.path().join("img"),
        resolution: 150,
        ..ImportConfig::default()
    }
}

async fn fresh_store() -> IngestionStore {
    let store = IngestionStore::open_in_memory().await.unwrap();
    migrate::run_migrations(&store).await.unwrap();
    store
}

async fn stored_record(store: &IngestionStore, name: &str) -> (String, String) {
    let row = sqlx::query("SELECT content, content_source FROM documents WHERE content_name = ?")
        .bind(name)
        .fetch_one(store.pool())
        .await
        .unwrap();
    (row.get("content"), row.get("content_source"))
}

#[tokio::test]
async fn text_pdf_is_stored_with_pages_in_order() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    let file = write_pdf(tmp.path(), "report.pdf", &["page one text", "page two text"]);

    let outcome = extract::import_file(&store, &file, &cfg).await.unwrap();
    assert_eq!(outcome, ImportOutcome::Imported);

    let (content, source) = stored_record(&store, "report.pdf").await;
    assert_eq!(content, "page one text\npage two text");
    assert_eq!(source, "Text");
}

#[tokio::test]
async fn reimport_of_same_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    let file = write_pdf(tmp.path(), "report.pdf", &["body"]);

    assert_eq!(
        extract::import_file(&store, &file, &cfg).await.unwrap(),
        ImportOutcome::Imported
    );
    assert_eq!(
        extract::import_file(&store, &file, &cfg).await.unwrap(),
        ImportOutcome::SkippedDuplicate
    );
    assert_eq!(store.document_count().await.unwrap(), 1);
}

#[tokio::test]
async fn textless_page_takes_ocr_provenance() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    // Page one has a text layer, page two is blank. The blank page goes
    // through the OCR fallback and recognizes nothing either way.
    let file = write_pdf(tmp.path(), "mixed.pdf", &["page one text", ""]);

    let outcome = extract::import_file(&store, &file, &cfg).await.unwrap();
    assert_eq!(outcome, ImportOutcome::Imported);

    let (content, source) = stored_record(&store, "mixed.pdf").await;
    assert_eq!(content, "page one text");
    assert_eq!(source, "OCR|Text");
}

#[tokio::test]
async fn fully_blank_pdf_is_not_stored() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    let file = write_pdf(tmp.path(), "blank.pdf", &[""]);

    let outcome = extract::import_file(&store, &file, &cfg).await.unwrap();
    assert_eq!(outcome, ImportOutcome::NotStored);
    assert_eq!(store.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn unreadable_pdf_fails_open() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    let file = tmp.path().join("bad.pdf");
    fs::write(&file, b"not a pdf at all").unwrap();

    let outcome = extract::import_file(&store, &file, &cfg).await.unwrap();
    assert_eq!(outcome, ImportOutcome::FailedOpen);
}

#[tokio::test]
async fn missing_file_fails_open() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;

    let outcome = extract::import_file(&store, &tmp.path().join("gone.pdf"), &cfg)
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::FailedOpen);
}

#[tokio::test]
async fn batch_summary_accounts_for_every_file() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;

    let good = write_pdf(tmp.path(), "good.pdf", &["usable"]);
    let blank = write_pdf(tmp.path(), "blank.pdf", &[""]);
    let bad = tmp.path().join("bad.pdf");
    fs::write(&bad, b"garbage").unwrap();
    let notes = tmp.path().join("notes.txt");
    fs::write(&notes, b"plain text").unwrap();

    let files = vec![good, blank, bad, notes];
    let summary = import::import_files(&store, &files, &cfg).await.unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.not_stored, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.unsupported, 1);
    assert_eq!(summary.duplicates, 0);
}

#[tokio::test]
async fn import_folder_walks_recursively() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;

    let input = tmp.path().join("in");
    fs::create_dir_all(input.join("nested")).unwrap();
    write_pdf(&input, "top.pdf", &["top body"]);
    write_pdf(&input.join("nested"), "deep.pdf", &["deep body"]);
    fs::write(input.join("ignored.txt"), b"x").unwrap();

    let summary = import::import_folder(&store, &input, &cfg).await.unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.unsupported, 0);
    assert_eq!(store.document_count().await.unwrap(), 2);
}

#[tokio::test]
async fn no_image_files_are_left_behind() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store = fresh_store().await;
    let file = write_pdf(tmp.path(), "mixed.pdf", &["text page", ""]);

    extract::import_file(&store, &file, &cfg).await.unwrap();

    // The per-file image folder may exist, but rasterized pages are
    // consumed by the recognition step and must not survive the import.
    let img_root = tmp.path().join("img");
    if img_root.is_dir() {
        let mut leftovers = Vec::new();
        collect_files_recursively(&img_root, &mut leftovers);
        assert!(leftovers.is_empty(), "leftover files: {:?}", leftovers);
    }
}

fn collect_files_recursively(dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursively(&path, out);
        } else {
            out.push(path);
        }
    }
}
