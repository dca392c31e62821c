use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::store::DocStore;

async fn bootstrap(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS documents (\
             id TEXT PRIMARY KEY, \
             collection TEXT NOT NULL, \
             body TEXT NOT NULL, \
             created_at TEXT NOT NULL, \
             updated_at TEXT NOT NULL\
         )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection)")
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn init_store(database_url: &str) -> anyhow::Result<DocStore> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid database url: {database_url}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to open document store")?;

    bootstrap(&pool)
        .await
        .context("failed to prepare document store schema")?;

    tracing::info!("document store ready");
    Ok(DocStore::new(pool))
}

/// Fresh private store for tests. One connection keeps the in-memory database
/// alive for the lifetime of the pool.
#[cfg(test)]
pub async fn open_in_memory() -> DocStore {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory store");
    bootstrap(&pool).await.expect("in-memory store schema");
    DocStore::new(pool)
}
