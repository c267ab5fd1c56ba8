use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

use crate::models::HistoryEntry;

/// Append-only log of past analyses. The pool is owned here and injected
/// into whoever needs it; it is opened once per process.
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Single connection: the deployment is single-user, and an
        // in-memory database must stay on one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = HistoryStore { pool };
        store.init_tables().await?;
        Ok(store)
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts one row. Duplicate filenames are allowed; the same food may
    /// be re-analyzed.
    pub async fn append(&self, filename: &str, response: &str) -> Result<()> {
        sqlx::query("INSERT INTO history (filename, response, created_at) VALUES (?, ?, ?)")
            .bind(filename)
            .bind(response)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Returns up to `limit` rows, most recently inserted first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, filename, response, created_at
            FROM history
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| HistoryEntry {
                id: Some(row.get(0)),
                filename: row.get(1),
                response: row.get(2),
                created_at: row.get(3),
            })
            .collect();

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> HistoryStore {
        HistoryStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_recent_returns_reverse_insertion_order() {
        let store = test_store().await;
        store.append("a.jpg", "r1").await.unwrap();
        store.append("b.jpg", "r2").await.unwrap();
        store.append("c.jpg", "r3").await.unwrap();

        let entries = store.recent(5).await.unwrap();
        let filenames: Vec<&str> = entries.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(filenames, vec!["c.jpg", "b.jpg", "a.jpg"]);
    }

    #[tokio::test]
    async fn test_recent_truncates_to_limit() {
        let store = test_store().await;
        for i in 0..7 {
            store.append(&format!("{i}.jpg"), "resp").await.unwrap();
        }

        let entries = store.recent(5).await.unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].filename, "6.jpg");
        assert_eq!(entries[4].filename, "2.jpg");
    }

    #[tokio::test]
    async fn test_recent_one_returns_latest_append() {
        let store = test_store().await;
        store.append("a.jpg", "r1").await.unwrap();
        store.append("b.jpg", "r2").await.unwrap();

        let entries = store.recent(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "b.jpg");
        assert_eq!(entries[0].response, "r2");
    }

    #[tokio::test]
    async fn test_duplicate_filenames_are_kept() {
        let store = test_store().await;
        store.append("same.jpg", "first").await.unwrap();
        store.append("same.jpg", "second").await.unwrap();

        let entries = store.recent(5).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].response, "second");
    }
}
