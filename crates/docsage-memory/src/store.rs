//! SQLite insight store.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use docsage_core::config::DocSageConfig;
use docsage_core::error::{DocSageError, Result};
use docsage_core::traits::InsightStore;
use docsage_core::types::MemoryRecord;
use rusqlite::Connection;

/// Durable insight storage in a single SQLite table.
///
/// One row per document id; upserts keep the original `created_at`.
/// `scan_all` returns rows in rowid order, which is insertion order.
pub struct SqliteInsightStore {
    conn: Mutex<Connection>,
}

impl SqliteInsightStore {
    /// Open (or create) the store at the default path,
    /// `~/.docsage/insights.db`.
    pub fn new() -> Result<Self> {
        Self::open(DocSageConfig::home_dir().join("insights.db"))
    }

    /// Open (or create) the store at a specific path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(path).map_err(|e| DocSageError::Memory(e.to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS insights (
                document_id TEXT PRIMARY KEY,
                insights TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|e| DocSageError::Memory(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DocSageError::Memory(e.to_string()))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
        let insights: String = row.get(1)?;
        let metadata: String = row.get(2)?;
        let created_at: String = row.get(3)?;
        let updated_at: String = row.get(4)?;
        Ok(MemoryRecord {
            document_id: row.get(0)?,
            insights: serde_json::from_str(&insights).unwrap_or_default(),
            metadata: serde_json::from_str(&metadata).unwrap_or_default(),
            created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                .map(|d| d.with_timezone(&chrono::Utc))
                .unwrap_or_default(),
            updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
                .map(|d| d.with_timezone(&chrono::Utc))
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl InsightStore for SqliteInsightStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, document_id: &str) -> Result<Option<MemoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT document_id, insights, metadata, created_at, updated_at
                 FROM insights WHERE document_id = ?1",
            )
            .map_err(|e| DocSageError::Memory(e.to_string()))?;

        let record = stmt
            .query_row(rusqlite::params![document_id], Self::row_to_record)
            .ok();
        Ok(record)
    }

    async fn put(&self, record: MemoryRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO insights (document_id, insights, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(document_id) DO UPDATE SET
                 insights = excluded.insights,
                 metadata = excluded.metadata,
                 updated_at = excluded.updated_at",
            rusqlite::params![
                record.document_id,
                record.insights.to_string(),
                record.metadata.to_string(),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DocSageError::Memory(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM insights WHERE document_id = ?1",
            rusqlite::params![document_id],
        )
        .map_err(|e| DocSageError::Memory(e.to_string()))?;
        Ok(())
    }

    async fn scan_all(&self) -> Result<Vec<MemoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT document_id, insights, metadata, created_at, updated_at
                 FROM insights ORDER BY rowid",
            )
            .map_err(|e| DocSageError::Memory(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_record)
            .map_err(|e| DocSageError::Memory(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}
