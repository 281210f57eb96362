//! In-process session memory.
//!
//! Holds per-document insights and the question/answer history for the
//! lifetime of one engine instance. Nothing here survives a restart;
//! durability is the bank's job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One answered question in the session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// Session-scoped working memory.
#[derive(Debug, Default)]
pub struct SessionMemory {
    insights: HashMap<String, Value>,
    history: Vec<ConversationTurn>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache insights for a document; last write wins.
    pub fn store_insights(&mut self, document_id: &str, insights: Value) {
        self.insights.insert(document_id.to_string(), insights);
    }

    pub fn insights(&self, document_id: &str) -> Option<&Value> {
        self.insights.get(document_id)
    }

    /// Append one answered question to the history.
    pub fn add_turn(&mut self, question: &str, answer: &str, confidence: f32) {
        self.history.push(ConversationTurn {
            question: question.to_string(),
            answer: answer.to_string(),
            confidence,
            timestamp: Utc::now(),
        });
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent_history(&self, n: usize) -> &[ConversationTurn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop the cached insights for one document.
    pub fn clear_document(&mut self, document_id: &str) {
        self.insights.remove(document_id);
    }

    /// Drop everything: insights and history.
    pub fn clear(&mut self) {
        self.insights.clear();
        self.history.clear();
    }
}
