//! OpenAI-compatible embedding provider
//!
//! Talks to any service exposing the `/v1/embeddings` contract
//! (OpenAI itself, or a local text-embeddings server hosting a
//! sentence-transformers model such as all-MiniLM-L6-v2).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::Embedder;
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Configuration for the embedding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; omitted for unauthenticated local servers.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with each request. The vector is a pure
    /// function of this model and the input text.
    #[serde(default = "default_model")]
    pub model: String,

    /// Expected vector dimension; responses of any other length are
    /// rejected as a configuration error.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            dimensions: default_dimensions(),
        }
    }
}

/// HTTP embedding provider.
#[derive(Debug)]
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
            dimensions: config.dimensions,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn build_request(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": [text],
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Vec<f32>, DomainError> {
        let response: EmbeddingsResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::model_unavailable(format!("malformed embedding response: {}", e))
        })?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::model_unavailable("embedding response contained no data"))?;

        if vector.len() != self.dimensions {
            return Err(DomainError::configuration(format!(
                "model '{}' returned {}-dimension vectors, configured for {}",
                self.model,
                vector.len(),
                self.dimensions,
            )));
        }

        Ok(vector)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let mut request = self
            .client
            .post(self.embeddings_url())
            .json(&self.build_request(text));

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            DomainError::model_unavailable(format!("embedding request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(DomainError::model_unavailable(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            DomainError::model_unavailable(format!("failed to read embedding response: {}", e))
        })?;

        self.parse_response(json)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_embedder(dimensions: usize) -> OpenAiEmbedder {
        OpenAiEmbedder::new(EmbeddingConfig {
            base_url: "http://localhost:8080/".to_string(),
            api_key: Some("test-key".to_string()),
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions,
        })
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let embedder = test_embedder(3);
        assert_eq!(embedder.embeddings_url(), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_build_request() {
        let embedder = test_embedder(3);
        let body = embedder.build_request("portfolio website");

        assert_eq!(
            body,
            json!({"model": "all-MiniLM-L6-v2", "input": ["portfolio website"]})
        );
    }

    #[test]
    fn test_parse_response() {
        let embedder = test_embedder(3);
        let vector = embedder
            .parse_response(json!({
                "model": "all-MiniLM-L6-v2",
                "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}],
            }))
            .unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_response_wrong_dimension() {
        let embedder = test_embedder(4);
        let result = embedder.parse_response(json!({
            "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}],
        }));

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_parse_response_empty_data() {
        let embedder = test_embedder(3);
        let result = embedder.parse_response(json!({"data": []}));

        assert!(matches!(result, Err(DomainError::ModelUnavailable { .. })));
    }

    #[test]
    fn test_metadata_accessors() {
        let embedder = test_embedder(384);

        assert_eq!(embedder.dimensions(), 384);
        assert_eq!(embedder.model_id(), "all-MiniLM-L6-v2");
    }
}
