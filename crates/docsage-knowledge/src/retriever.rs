//! Question-time retrieval.
//!
//! Embeds the question with the same embedder the index was built with
//! and returns the top-K passages by ascending distance. Degrades to an
//! empty result set — "no relevant content found" — when the index is
//! missing, empty, or the embedding call fails; never an error.

use docsage_core::traits::Embedder;
use docsage_core::types::RetrievalResult;

use crate::index::PassageIndex;

/// Retrieve at most `top_k` passages relevant to `question`.
pub async fn retrieve(
    index: Option<&PassageIndex>,
    embedder: &dyn Embedder,
    question: &str,
    top_k: usize,
) -> Vec<RetrievalResult> {
    let Some(index) = index else {
        tracing::debug!("no index for document, returning no passages");
        return Vec::new();
    };
    if !index.is_ready() {
        return Vec::new();
    }

    let embedding = match embedder.embed(question).await {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("question embedding failed: {e}");
            return Vec::new();
        }
    };

    let results = index.query(&embedding, top_k);
    tracing::debug!(
        document_id = index.document_id(),
        results = results.len(),
        "retrieved passages"
    );
    results
}
