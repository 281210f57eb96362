//! Embedding providers.
//!
//! `HttpEmbedder` calls an OpenAI-compatible `/embeddings` endpoint;
//! `HashEmbedder` is a local deterministic feature-hashing model used
//! when no embedding service is configured. Both paths must stay on one
//! model per index — the engine shares a single instance across build
//! and query.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use docsage_core::error::{DocSageError, Result};
use docsage_core::traits::Embedder;
use serde_json::{json, Value};

/// Deterministic local embedder: hashed bag-of-words.
///
/// Each lowercased alphanumeric token is hashed into one of
/// `dimensions` buckets; the bucket vector is L2-normalized. Crude, but
/// fully deterministic, offline, and good enough for lexical-overlap
/// similarity.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimensions
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            vector[self.bucket(&token)] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

/// Embedder over an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(
        name: &str,
        base_url: String,
        api_key: String,
        model: &str,
        dimensions: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_url,
            api_key,
            model: model.to_string(),
            dimensions,
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

    fn parse_embeddings(&self, json: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
        let data = json["data"]
            .as_array()
            .ok_or_else(|| DocSageError::Provider("no data in embeddings response".into()))?;
        if data.len() != expected {
            return Err(DocSageError::Provider(format!(
                "embeddings response has {} rows, expected {expected}",
                data.len()
            )));
        }

        data.iter()
            .map(|row| {
                row["embedding"]
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_f64())
                            .map(|v| v as f32)
                            .collect::<Vec<f32>>()
                    })
                    .ok_or_else(|| {
                        DocSageError::Provider("malformed embedding row in response".into())
                    })
            })
            .collect()
    }

    async fn request(&self, input: Value, rows: usize) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": input,
        });

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
            let msg = format!("{} embeddings API error {status}: {text}", self.name);
            tracing::warn!("{msg}");
            return Err(DocSageError::Provider(msg));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| DocSageError::Http(e.to_string()))?;
        self.parse_embeddings(&json, rows)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut rows = self.request(json!(text), 1).await?;
        Ok(rows.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(json!(texts), texts.len()).await
    }
}
