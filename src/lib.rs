//! # Textmill
//!
//! An offline batch pipeline that ingests PDF documents from a directory
//! tree, extracts their text page by page (falling back to rasterization
//! plus OCR for pages without a text layer), deduplicates against a SQLite
//! document store, and aggregates the stored text into word-frequency
//! statistics.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────┐   ┌───────────┐
//! │  collect  │──▶│  extract (per file)  │──▶│  SQLite   │
//! │ (walkdir) │   │  layout | raster+ocr │   │ documents │
//! └───────────┘   └──────────────────────┘   └─────┬─────┘
//!                                                  │
//!                                                  ▼
//!                                            ┌───────────┐
//!                                            │   freq    │
//!                                            └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tmill init                    # create database
//! tmill import ./pdfs           # ingest a folder of PDFs
//! tmill stats --top 50          # word-frequency table
//! tmill doctor                  # check pdftoppm / tesseract availability
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`collect`] | Recursive file collection |
//! | [`layout`] | Page layout tree and direct text extraction |
//! | [`raster`] | Single-page rasterization for OCR |
//! | [`ocr`] | External OCR invocation |
//! | [`extract`] | Per-file extraction state machine |
//! | [`store`] | Document store handle and connection lifecycle |
//! | [`import`] | Batch import driver |
//! | [`freq`] | Word-frequency aggregation |
//! | [`naming`] | Collision-free artifact naming |
//! | [`migrate`] | Schema migrations |
//! | [`doctor`] | External tool health check |

pub mod collect;
pub mod config;
pub mod doctor;
pub mod extract;
pub mod freq;
pub mod import;
pub mod layout;
pub mod migrate;
pub mod models;
pub mod naming;
pub mod ocr;
pub mod raster;
pub mod store;
