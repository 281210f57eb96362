//! The persisted insight bank.
//!
//! A thin layer over an [`InsightStore`] backend that owns the
//! cross-document semantics: upsert timestamps, substring-ranked
//! search, and age-based compaction.

use chrono::{Duration, Utc};
use docsage_core::error::Result;
use docsage_core::traits::InsightStore;
use docsage_core::types::{InsightSearchHit, MemoryRecord};
use serde_json::Value;

pub struct MemoryBank {
    store: Box<dyn InsightStore>,
}

impl MemoryBank {
    pub fn new(store: Box<dyn InsightStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &str {
        self.store.name()
    }

    /// Upsert insights for a document. A re-store keeps the original
    /// `created_at` and refreshes `updated_at`.
    pub async fn store(&self, document_id: &str, insights: Value, metadata: Value) -> Result<()> {
        let now = Utc::now();
        let created_at = match self.store.get(document_id).await? {
            Some(existing) => existing.created_at,
            None => now,
        };
        self.store
            .put(MemoryRecord {
                document_id: document_id.to_string(),
                insights,
                metadata,
                created_at,
                updated_at: now,
            })
            .await
    }

    pub async fn retrieve(&self, document_id: &str) -> Result<Option<MemoryRecord>> {
        self.store.get(document_id).await
    }

    pub async fn delete(&self, document_id: &str) -> Result<()> {
        self.store.delete(document_id).await
    }

    /// Ids of every document with stored insights, insertion order.
    pub async fn all_documents(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .scan_all()
            .await?
            .into_iter()
            .map(|r| r.document_id)
            .collect())
    }

    /// Rank stored insights by raw occurrence count of the query
    /// substring, case-insensitive, over the serialized insight JSON.
    /// Zero-occurrence records are dropped; ties keep insertion order.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<InsightSearchHit>> {
        let needle = query.to_lowercase();
        if needle.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<InsightSearchHit> = Vec::new();
        for record in self.store.scan_all().await? {
            let haystack = record.insights.to_string().to_lowercase();
            let relevance = haystack.matches(&needle).count();
            if relevance > 0 {
                hits.push(InsightSearchHit {
                    document_id: record.document_id,
                    insights: record.insights,
                    metadata: record.metadata,
                    relevance,
                });
            }
        }

        // Stable sort: equal relevance preserves scan order.
        hits.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        hits.truncate(limit);
        Ok(hits)
    }

    /// Delete records not updated within `max_age_days`. Returns the
    /// number removed.
    pub async fn compact(&self, max_age_days: i64) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        let mut removed = 0usize;
        for record in self.store.scan_all().await? {
            if record.updated_at < cutoff {
                self.store.delete(&record.document_id).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, max_age_days, "compacted stale insight records");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteInsightStore;
    use serde_json::json;

    fn temp_bank() -> (tempfile::TempDir, MemoryBank) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteInsightStore::open(dir.path().join("insights.db")).unwrap();
        (dir, MemoryBank::new(Box::new(store)))
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_a", json!({"summary": "budget review"}), json!({}))
            .await
            .unwrap();

        let record = bank.retrieve("doc_a").await.unwrap().unwrap();
        assert_eq!(record.insights["summary"], "budget review");
        assert!(bank.retrieve("doc_b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_keeps_created_at() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_a", json!({"v": 1}), json!({})).await.unwrap();
        let first = bank.retrieve("doc_a").await.unwrap().unwrap();

        bank.store("doc_a", json!({"v": 2}), json!({})).await.unwrap();
        let second = bank.retrieve("doc_a").await.unwrap().unwrap();

        assert_eq!(second.insights["v"], 2);
        assert_eq!(second.created_at.to_rfc3339(), first.created_at.to_rfc3339());
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_search_ranks_by_occurrences() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_once", json!({"notes": "revenue mentioned"}), json!({}))
            .await
            .unwrap();
        bank.store(
            "doc_twice",
            json!({"notes": "revenue up, revenue forecasts strong"}),
            json!({}),
        )
        .await
        .unwrap();
        bank.store("doc_never", json!({"notes": "all about staffing"}), json!({}))
            .await
            .unwrap();

        let hits = bank.search("Revenue", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document_id, "doc_twice");
        assert_eq!(hits[0].relevance, 2);
        assert_eq!(hits[1].document_id, "doc_once");
    }

    #[tokio::test]
    async fn test_search_tie_keeps_insertion_order() {
        let (_dir, bank) = temp_bank();
        for id in ["doc_b", "doc_a"] {
            bank.store(id, json!({"notes": "one deadline here"}), json!({}))
                .await
                .unwrap();
        }
        let hits = bank.search("deadline", 10).await.unwrap();
        assert_eq!(hits[0].document_id, "doc_b");
        assert_eq!(hits[1].document_id, "doc_a");
    }

    #[tokio::test]
    async fn test_search_empty_query() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_a", json!({"notes": "text"}), json!({})).await.unwrap();
        assert!(bank.search("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compact_removes_only_stale_records() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_fresh", json!({}), json!({})).await.unwrap();

        // Plant a stale record directly through the store.
        let old = Utc::now() - Duration::days(120);
        bank.store
            .put(MemoryRecord {
                document_id: "doc_stale".to_string(),
                insights: json!({}),
                metadata: json!({}),
                created_at: old,
                updated_at: old,
            })
            .await
            .unwrap();

        let removed = bank.compact(90).await.unwrap();
        assert_eq!(removed, 1);
        assert!(bank.retrieve("doc_stale").await.unwrap().is_none());
        assert!(bank.retrieve("doc_fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_all_documents() {
        let (_dir, bank) = temp_bank();
        bank.store("doc_1", json!({}), json!({})).await.unwrap();
        bank.store("doc_2", json!({}), json!({})).await.unwrap();
        assert_eq!(bank.all_documents().await.unwrap(), vec!["doc_1", "doc_2"]);
    }
}
