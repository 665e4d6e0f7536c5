use anyhow::Result;

use crate::store::IngestionStore;

/// Idempotent schema creation. The uniqueness constraint on the natural
/// key backs the store's at-most-once insert.
pub async fn run_migrations(store: &IngestionStore) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            content_name TEXT NOT NULL,
            content_url TEXT NOT NULL,
            filecreated_date TEXT NOT NULL,
            filemodified_date TEXT NOT NULL,
            imported_date TEXT NOT NULL,
            content_source TEXT NOT NULL,
            content TEXT NOT NULL,
            UNIQUE(content_name, filecreated_date)
        )
        "#,
    )
    .execute(store.pool())
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_content_name ON documents(content_name)")
        .execute(store.pool())
        .await?;

    Ok(())
}
