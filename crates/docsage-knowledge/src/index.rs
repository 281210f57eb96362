//! Per-document passage index.
//!
//! One index per document (collection-per-document); entries hold the
//! passage, its embedding, and metadata sufficient to reconstruct
//! citations without re-reading the source. Queries are brute-force
//! cosine distance over the entries — indexes are per-document and
//! rebuilt per run, so the entry count stays small.

use std::collections::HashMap;

use docsage_core::error::{DocSageError, Result};
use docsage_core::traits::Embedder;
use docsage_core::types::{Passage, RetrievalResult};
use sha2::{Digest, Sha256};

/// One stored passage with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Unique within the index, assigned by chunk order (`chunk_{i}`).
    pub id: String,
    pub embedding: Vec<f32>,
    pub passage: Passage,
}

/// Vector index over one document's passages.
#[derive(Debug, Default)]
pub struct PassageIndex {
    document_id: String,
    entries: Vec<IndexEntry>,
    /// Embedding dimensionality, constant across entries.
    dimensions: usize,
}

impl PassageIndex {
    fn new(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            entries: Vec::new(),
            dimensions: 0,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An index with no entries is not ready: queries return nothing.
    pub fn is_ready(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Nearest-neighbor lookup: at most `top_k` results, ascending by
    /// cosine distance (lower = more similar).
    pub fn query(&self, embedding: &[f32], top_k: usize) -> Vec<RetrievalResult> {
        if self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<RetrievalResult> = self
            .entries
            .iter()
            .map(|e| RetrievalResult {
                passage: e.passage.clone(),
                distance: cosine_distance(embedding, &e.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        scored
    }
}

/// Registry of per-document indexes.
///
/// Independent, non-interacting index instances; no shared mutable
/// state across documents.
#[derive(Default)]
pub struct IndexRegistry {
    indexes: HashMap<String, PassageIndex>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for `document_id` from its passages.
    ///
    /// Idempotent: a second build for the same document id reuses the
    /// existing index instead of duplicating entries. An empty passage
    /// list is a no-op — the document simply has no ready index and
    /// queries against it return nothing.
    pub async fn build(
        &mut self,
        document_id: &str,
        passages: &[Passage],
        embedder: &dyn Embedder,
    ) -> Result<usize> {
        if let Some(existing) = self.indexes.get(document_id) {
            if existing.is_ready() {
                tracing::debug!(document_id, "index already built, reusing");
                return Ok(existing.len());
            }
        }

        if passages.is_empty() {
            tracing::warn!(document_id, "no passages supplied, skipping index build");
            return Ok(0);
        }

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let mut index = PassageIndex::new(document_id);
        index.dimensions = embedder.dimensions();

        for (i, (passage, embedding)) in passages.iter().zip(embeddings).enumerate() {
            if embedding.len() != index.dimensions {
                return Err(DocSageError::Index(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    index.dimensions,
                    embedding.len()
                )));
            }
            index.entries.push(IndexEntry {
                id: format!("chunk_{i}"),
                embedding,
                passage: passage.clone(),
            });
        }

        let count = index.entries.len();
        self.indexes.insert(document_id.to_string(), index);
        tracing::info!(document_id, passages = count, "passage index built");
        Ok(count)
    }

    /// Look up a document's index, if built.
    pub fn get(&self, document_id: &str) -> Option<&PassageIndex> {
        self.indexes.get(document_id)
    }

    /// Whether queries against this document can return results.
    pub fn is_ready(&self, document_id: &str) -> bool {
        self.indexes
            .get(document_id)
            .map(|i| i.is_ready())
            .unwrap_or(false)
    }

    /// Drop a document's index.
    pub fn remove(&mut self, document_id: &str) {
        self.indexes.remove(document_id);
    }
}

/// Deterministic document id from the source string: `doc_` + first
/// 12 hex chars of the content hash.
pub fn document_id(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("doc_{}", &hex[..12])
}

/// Cosine distance: 1 − cosine similarity, clamped at 0.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    dot / denom
}
