//! Unified OpenAI-compatible generator.
//!
//! A single struct that handles chat completions for all
//! OpenAI-compatible APIs. Providers are distinguished only by endpoint
//! URL and API key.

use async_trait::async_trait;
use docsage_core::error::{DocSageError, Result};
use docsage_core::traits::Generator;
use serde_json::{json, Value};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on \
document content. Always cite page numbers when available.";

/// A generator that works with any OpenAI-compatible chat API.
pub struct OpenAiCompatibleGenerator {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleGenerator {
    pub fn new(
        name: &str,
        base_url: String,
        api_key: String,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_url,
            api_key,
            model: model.to_string(),
            temperature,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl Generator for OpenAiCompatibleGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let url = format!("{}/chat/completions", self.base_url);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let resp = self.apply_auth(req).send().await.map_err(|e| {
            let msg = format!("{} connection failed ({url}): {e}", self.name);
            tracing::warn!("{msg}");
            DocSageError::Http(msg)
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            let msg = format!("{} API error {status}: {text}", self.name);
            tracing::warn!("{msg}");
            return Err(DocSageError::Provider(msg));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| DocSageError::Http(e.to_string()))?;

        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| DocSageError::Provider("no choices in response".into()))?;

        Ok(content.trim().to_string())
    }
}
