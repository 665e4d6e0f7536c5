//! Document store handle.
//!
//! An explicitly constructed, passed-by-reference handle over SQLite with
//! an open/close lifecycle. Duplicate detection is by the natural key
//! `(content_name, filecreated_date)`; the schema's uniqueness constraint
//! plus a conflict-free insert make `insert_if_absent` authoritative even
//! if a future caller runs imports concurrently.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{DocumentKey, DocumentRecord};

pub struct IngestionStore {
    pool: SqlitePool,
}

impl IngestionStore {
    /// Open (creating the database file if missing). The parent directory
    /// is created on demand.
    pub async fn open(config: &Config) -> Result<Self> {
        let db_path = &config.db.path;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// An in-memory store, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Existence check by natural key.
    pub async fn exists(&self, key: &DocumentKey) -> Result<bool> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT id FROM documents WHERE content_name = ? AND filecreated_date = ? LIMIT 1",
        )
        .bind(&key.content_name)
        .bind(&key.filecreated_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Insert unless a record with the same natural key exists. Returns
    /// whether the insert actually occurred.
    pub async fn insert_if_absent(&self, record: &DocumentRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (id, content_name, content_url, filecreated_date,
                                   filemodified_date, imported_date, content_source, content)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_name, filecreated_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&record.content_name)
        .bind(&record.content_url)
        .bind(&record.filecreated_date)
        .bind(&record.filemodified_date)
        .bind(&record.imported_date)
        .bind(&record.content_source)
        .bind(&record.content)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All stored document bodies, for frequency aggregation.
    pub async fn all_content(&self) -> Result<Vec<String>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT content FROM documents")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn document_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
