//! Text generation capability (optional).

use async_trait::async_trait;

use crate::error::Result;

/// An external text-generation service. May fail or time out; callers
/// degrade to the extractive composer rather than propagating errors.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
