//! # DocSage Memory
//!
//! Two memory tiers and the coordinator that fronts them:
//! - [`session`] — in-process working memory (insights cache,
//!   conversation history);
//! - [`bank`] + [`store`] — the persisted insight bank over a durable
//!   keyed backend;
//! - [`MemoryCoordinator`] — session-first reads, write-through writes.

pub mod bank;
pub mod session;
pub mod store;

pub use bank::MemoryBank;
pub use session::{ConversationTurn, SessionMemory};
pub use store::SqliteInsightStore;

use docsage_core::config::MemoryConfig;
use docsage_core::error::{DocSageError, Result};
use docsage_core::types::{InsightSearchHit, MemoryRecord};
use serde_json::Value;

/// Builds the configured insight store backend.
pub fn create_store(config: &MemoryConfig) -> Result<Box<dyn docsage_core::traits::InsightStore>> {
    match config.backend.as_str() {
        "sqlite" => {
            let store = if config.db_path.is_empty() {
                SqliteInsightStore::new()?
            } else {
                SqliteInsightStore::open(&config.db_path)?
            };
            Ok(Box::new(store))
        }
        other => Err(DocSageError::Config(format!(
            "unknown memory backend: {other}"
        ))),
    }
}

/// Fronts both memory tiers.
///
/// Reads check the session cache before the bank; writes go through to
/// both, so a recall after restart still finds the insights.
pub struct MemoryCoordinator {
    session: SessionMemory,
    bank: MemoryBank,
}

impl MemoryCoordinator {
    pub fn new(bank: MemoryBank) -> Self {
        Self {
            session: SessionMemory::new(),
            bank,
        }
    }

    /// Build from config, resolving the store backend.
    pub fn from_config(config: &MemoryConfig) -> Result<Self> {
        Ok(Self::new(MemoryBank::new(create_store(config)?)))
    }

    /// Cache insights in the session; when `persist` is set, write
    /// them through to the bank as well. Session-only insights are gone
    /// after `clear_session` or a restart.
    pub async fn store_insights(
        &mut self,
        document_id: &str,
        insights: Value,
        metadata: Value,
        persist: bool,
    ) -> Result<()> {
        self.session.store_insights(document_id, insights.clone());
        if persist {
            self.bank.store(document_id, insights, metadata).await?;
        }
        Ok(())
    }

    /// Session first; on a bank hit the session cache is warmed so the
    /// next recall is local.
    pub async fn recall_insights(&mut self, document_id: &str) -> Result<Option<Value>> {
        if let Some(insights) = self.session.insights(document_id) {
            return Ok(Some(insights.clone()));
        }
        match self.bank.retrieve(document_id).await? {
            Some(record) => {
                self.session
                    .store_insights(document_id, record.insights.clone());
                Ok(Some(record.insights))
            }
            None => Ok(None),
        }
    }

    pub fn add_turn(&mut self, question: &str, answer: &str, confidence: f32) {
        self.session.add_turn(question, answer, confidence);
    }

    pub fn recent_history(&self, n: usize) -> &[ConversationTurn] {
        self.session.recent_history(n)
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<InsightSearchHit>> {
        self.bank.search(query, limit).await
    }

    pub async fn compact(&self, max_age_days: i64) -> Result<usize> {
        self.bank.compact(max_age_days).await
    }

    pub async fn retrieve_record(&self, document_id: &str) -> Result<Option<MemoryRecord>> {
        self.bank.retrieve(document_id).await
    }

    pub async fn all_documents(&self) -> Result<Vec<String>> {
        self.bank.all_documents().await
    }

    pub async fn forget(&mut self, document_id: &str) -> Result<()> {
        self.session.clear_document(document_id);
        self.bank.delete(document_id).await
    }

    /// Drop the session tier only; the bank is untouched.
    pub fn clear_session(&mut self) {
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_coordinator() -> (tempfile::TempDir, MemoryCoordinator) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteInsightStore::open(dir.path().join("insights.db")).unwrap();
        (dir, MemoryCoordinator::new(MemoryBank::new(Box::new(store))))
    }

    #[tokio::test]
    async fn test_recall_survives_session_clear() {
        let (_dir, mut mem) = temp_coordinator();
        mem.store_insights("doc_a", json!({"summary": "notes"}), json!({}), true)
            .await
            .unwrap();

        mem.clear_session();
        let recalled = mem.recall_insights("doc_a").await.unwrap().unwrap();
        assert_eq!(recalled["summary"], "notes");
    }

    #[tokio::test]
    async fn test_session_only_insights_do_not_reach_the_bank() {
        let (_dir, mut mem) = temp_coordinator();
        mem.store_insights("doc_a", json!({"summary": "scratch"}), json!({}), false)
            .await
            .unwrap();

        // Recallable while the session lives...
        let recalled = mem.recall_insights("doc_a").await.unwrap().unwrap();
        assert_eq!(recalled["summary"], "scratch");
        // ...but the bank never saw it.
        assert!(mem.retrieve_record("doc_a").await.unwrap().is_none());
        assert!(mem.search("scratch", 5).await.unwrap().is_empty());

        mem.clear_session();
        assert!(mem.recall_insights("doc_a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recall_unknown_document() {
        let (_dir, mut mem) = temp_coordinator();
        assert!(mem.recall_insights("doc_unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget_drops_both_tiers() {
        let (_dir, mut mem) = temp_coordinator();
        mem.store_insights("doc_a", json!({"v": 1}), json!({}), true)
            .await
            .unwrap();
        mem.forget("doc_a").await.unwrap();
        assert!(mem.recall_insights("doc_a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_flows_through() {
        let (_dir, mut mem) = temp_coordinator();
        mem.add_turn("What is the deadline?", "March 5.", 0.85);
        let recent = mem.recent_history(5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].answer, "March 5.");
    }

    #[test]
    fn test_create_store_unknown_backend() {
        let config = MemoryConfig {
            backend: "redis".into(),
            db_path: String::new(),
            max_age_days: 90,
        };
        assert!(create_store(&config).is_err());
    }
}
