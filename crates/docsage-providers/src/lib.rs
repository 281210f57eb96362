//! # DocSage Providers
//!
//! Implementations of the embedding and generation capabilities.
//!
//! All HTTP providers speak the OpenAI-compatible API shape and differ
//! only by endpoint and key. The `local` embedder is a deterministic
//! feature-hashing model that needs no network — the default, so the
//! engine works out of the box.
//!
//! Capability resolution happens once, at construction: a bad provider
//! name or a missing key for a cloud provider fails here, never at
//! first use.

pub mod embeddings;
pub mod openai_compatible;

use docsage_core::config::DocSageConfig;
use docsage_core::error::{DocSageError, Result};
use docsage_core::traits::{Embedder, Generator};

/// Known OpenAI-compatible endpoints.
fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("https://api.openai.com/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "lmstudio" => Some("http://localhost:1234/v1"),
        _ => None,
    }
}

/// Whether a provider requires an API key.
fn requires_api_key(provider: &str) -> bool {
    matches!(provider, "openai")
}

/// Create the embedding capability from configuration.
pub fn create_embedder(config: &DocSageConfig) -> Result<Box<dyn Embedder>> {
    let cfg = &config.embedding;
    match cfg.provider.as_str() {
        "local" => Ok(Box::new(embeddings::HashEmbedder::new(cfg.dimensions))),
        name => {
            let base_url = resolve_base_url(name, &cfg.endpoint)?;
            let api_key = resolve_api_key(name, &cfg.api_key)?;
            Ok(Box::new(embeddings::HttpEmbedder::new(
                name,
                base_url,
                api_key,
                &cfg.model,
                cfg.dimensions,
            )))
        }
    }
}

/// Create the generation capability from configuration.
///
/// Returns `None` when generation is disabled — the caller selects the
/// extractive answer strategy instead.
pub fn create_generator(config: &DocSageConfig) -> Result<Option<Box<dyn Generator>>> {
    let cfg = &config.generation;
    if !cfg.enabled {
        return Ok(None);
    }

    let base_url = resolve_base_url(&cfg.provider, &cfg.endpoint)?;
    let api_key = resolve_api_key(&cfg.provider, &cfg.api_key)?;
    Ok(Some(Box::new(
        openai_compatible::OpenAiCompatibleGenerator::new(
            &cfg.provider,
            base_url,
            api_key,
            &cfg.model,
            cfg.temperature,
            cfg.max_tokens,
        ),
    )))
}

/// Base URL: explicit endpoint > known provider default.
fn resolve_base_url(provider: &str, endpoint: &str) -> Result<String> {
    if !endpoint.is_empty() {
        return Ok(endpoint.trim_end_matches('/').to_string());
    }
    default_base_url(provider)
        .map(String::from)
        .ok_or_else(|| {
            DocSageError::Config(format!(
                "unknown provider '{provider}' and no endpoint configured"
            ))
        })
}

/// API key: config > environment. Fatal for providers that require one.
fn resolve_api_key(provider: &str, configured: &str) -> Result<String> {
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }
    let from_env = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if from_env.is_empty() && requires_api_key(provider) {
        return Err(DocSageError::Config(format!(
            "provider '{provider}' requires an API key (config or OPENAI_API_KEY)"
        )));
    }
    Ok(from_env)
}
