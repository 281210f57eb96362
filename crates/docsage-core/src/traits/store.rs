//! Durable keyed storage backing the persisted memory tier.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::MemoryRecord;

/// A durable keyed store of [`MemoryRecord`]s.
///
/// One record per document id; `put` overwrites (last write wins, no
/// conflict detection). `scan_all` returns records in insertion order —
/// search tie-breaking depends on it.
#[async_trait]
pub trait InsightStore: Send + Sync {
    /// Backend name (e.g., "sqlite").
    fn name(&self) -> &str;

    async fn get(&self, document_id: &str) -> Result<Option<MemoryRecord>>;

    async fn put(&self, record: MemoryRecord) -> Result<()>;

    async fn delete(&self, document_id: &str) -> Result<()>;

    async fn scan_all(&self) -> Result<Vec<MemoryRecord>>;
}
