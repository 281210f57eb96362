//! Core data model for document Q&A.
//!
//! These are the tagged record types that flow through the pipeline.
//! Collaborator output (the document reader) is validated into
//! [`DocumentInput`] at the boundary; nothing downstream handles loose
//! JSON shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bounded excerpt of document text — the unit of retrieval.
///
/// Immutable after creation; owned by the passage index that holds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// Passage text.
    pub text: String,
    /// Source page number (1-based), if the document is paginated.
    pub page: Option<u32>,
    /// Position of this passage in chunk order.
    pub chunk_index: usize,
    /// Character count of `text`.
    pub char_count: usize,
    /// Word count of `text`.
    pub word_count: usize,
}

impl Passage {
    /// Build a passage from text, deriving the count fields.
    pub fn new(text: String, chunk_index: usize) -> Self {
        let char_count = text.chars().count();
        let word_count = text.split_whitespace().count();
        Self {
            text,
            page: None,
            chunk_index,
            char_count,
            word_count,
        }
    }

    /// Same, stamped with a source page.
    pub fn with_page(text: String, chunk_index: usize, page: u32) -> Self {
        let mut p = Self::new(text, chunk_index);
        p.page = Some(page);
        p
    }
}

/// One passage returned from a similarity query.
///
/// Lower distance means more similar. Result sequences are ordered
/// ascending by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub passage: Passage,
    /// Cosine distance to the query embedding, >= 0.
    pub distance: f32,
}

/// A page-level pointer justifying part of an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub page: u32,
    /// Leading excerpt of the cited passage.
    pub excerpt: String,
}

/// The scored result of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
    /// Heuristic confidence in [0, 1]. Not a calibrated probability.
    pub confidence: f32,
    /// Number of passages that supported this answer.
    pub supporting_passages: usize,
}

impl Answer {
    /// Sentinel answer used when the engine cannot answer at all
    /// (no index built, no document loaded). Never an error.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            text: reason.to_string(),
            citations: Vec::new(),
            confidence: 0.0,
            supporting_passages: 0,
        }
    }
}

/// Per-page metadata reported by the document reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u32,
    pub char_count: usize,
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub has_text: bool,
}

/// Document-level metadata from the reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub pages: Vec<PageInfo>,
}

/// The document reader collaborator's output, validated at the boundary.
///
/// `chunks` may be pre-computed by the reader; when absent the engine
/// chunks `text` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub text: String,
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub chunks: Option<Vec<Passage>>,
}

impl DocumentInput {
    /// Boundary validation: reject shapes the pipeline cannot ground
    /// answers in.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.metadata.source.trim().is_empty() {
            return Err(crate::error::DocSageError::Document(
                "document metadata is missing a source".into(),
            ));
        }
        if let Some(chunks) = &self.chunks {
            for c in chunks {
                if c.text.is_empty() {
                    return Err(crate::error::DocSageError::Document(format!(
                        "reader supplied an empty chunk at index {}",
                        c.chunk_index
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A persisted insight record, keyed by document id.
///
/// Unique per document id; last write wins on `insights`. Survives
/// process restarts until deleted or compacted away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub document_id: String,
    pub insights: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ranked hit from an insight search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSearchHit {
    pub document_id: String,
    pub insights: serde_json::Value,
    pub metadata: serde_json::Value,
    /// Raw occurrence count of the query substring.
    pub relevance: usize,
}
