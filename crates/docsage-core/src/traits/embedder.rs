//! Embedding capability.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into a fixed-length vector for similarity comparison.
///
/// Index-build and query paths must use the same embedder instance —
/// mixing models produces meaningless distances. The engine enforces
/// this by resolving the embedder once at construction and sharing it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name (e.g., "local", "openai").
    fn name(&self) -> &str;

    /// Vector length this embedder produces.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch. Default: sequential single embeds.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }
}
