//! Embedding provider trait and implementations.
//!
//! - `HttpEmbeddingProvider` calls an OpenAI-compatible `/embeddings`
//!   endpoint via reqwest. Credentials and model selection come from the
//!   configuration structure passed at construction, never from ambient
//!   environment variables.
//! - `MockEmbedding` provides deterministic hash-based unit vectors for
//!   testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Deserialize;
use tracing::debug;

use shoptalk_core::config::EmbeddingConfig;
use shoptalk_core::error::ShoptalkError;

/// Service for generating text embeddings.
///
/// Implementations convert text into fixed-dimensional vectors used for
/// similarity comparison, both at indexing time and at query time.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, ShoptalkError>> + Send;

    /// Return the dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Object-safe version of [`EmbeddingProvider`] for dynamic dispatch.
///
/// Because `EmbeddingProvider::embed` returns `impl Future` it is not
/// object-safe. This trait uses a boxed future instead, allowing
/// `Box<dyn DynEmbeddingProvider>` to be stored in structs without generics.
///
/// A blanket implementation is provided so that every `EmbeddingProvider`
/// automatically implements `DynEmbeddingProvider`.
pub trait DynEmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, ShoptalkError>> + Send + 'a>,
    >;

    /// Return the dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

impl<T: EmbeddingProvider> DynEmbeddingProvider for T {
    fn embed_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<f32>, ShoptalkError>> + Send + 'a>,
    > {
        Box::pin(self.embed(text))
    }

    fn dimensions(&self) -> usize {
        EmbeddingProvider::dimensions(self)
    }
}

// ---------------------------------------------------------------------------
// HttpEmbeddingProvider - remote OpenAI-compatible endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Embedding provider backed by a remote OpenAI-compatible API.
///
/// Sends `POST {base_url}/embeddings` with `{"input": text, "model": model}`
/// and reads the first embedding from the response.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl HttpEmbeddingProvider {
    /// Create a provider from the embedding section of the configuration.
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ShoptalkError> {
        if text.is_empty() {
            return Err(ShoptalkError::Embedding(
                "Cannot embed empty text".to_string(),
            ));
        }

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "input": text,
                "model": self.model,
            }))
            .send()
            .await
            .map_err(|e| ShoptalkError::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ShoptalkError::Embedding(format!(
                "Endpoint returned {}",
                response.status()
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| ShoptalkError::Embedding(format!("Invalid response body: {}", e)))?;

        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ShoptalkError::Embedding("Response contained no embedding".to_string()))?;

        if vector.len() != self.dimensions {
            return Err(ShoptalkError::Embedding(format!(
                "Expected {} dimensions, got {}",
                self.dimensions,
                vector.len()
            )));
        }

        debug!(model = %self.model, dims = vector.len(), "Embedded query text");
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// MockEmbedding - deterministic hash-based vectors for testing
// ---------------------------------------------------------------------------

/// Mock embedding provider that returns deterministic 384-dimensional unit
/// vectors.
///
/// The output is derived from a hash of the input text, so identical inputs
/// always produce identical outputs. This allows testing retrieval ranking
/// and idempotence without a real provider.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedding;

impl MockEmbedding {
    pub fn new() -> Self {
        Self
    }

    fn hash_to_vector(text: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(384);
        for i in 0..384 {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        // L2-normalize so cosine ranking matches what a real provider's
        // normalized vectors would produce.
        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ShoptalkError> {
        if text.is_empty() {
            return Err(ShoptalkError::Embedding(
                "Cannot embed empty text".to_string(),
            ));
        }
        Ok(Self::hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        384
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedding_dimension() {
        let provider = MockEmbedding::new();
        let vec = provider.embed("hello world").await.unwrap();
        assert_eq!(vec.len(), 384);
    }

    #[tokio::test]
    async fn test_mock_embedding_deterministic() {
        let provider = MockEmbedding::new();
        let v1 = provider.embed("same text").await.unwrap();
        let v2 = provider.embed("same text").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_different_inputs() {
        let provider = MockEmbedding::new();
        let v1 = provider.embed("text one").await.unwrap();
        let v2 = provider.embed("text two").await.unwrap();
        assert_ne!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_empty_text() {
        let provider = MockEmbedding::new();
        assert!(provider.embed("").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_embedding_is_unit_vector() {
        let provider = MockEmbedding::new();
        let vec = provider.embed("normalize me").await.unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_dyn_blanket_impl() {
        let boxed: Box<dyn DynEmbeddingProvider> = Box::new(MockEmbedding::new());
        let vec = boxed.embed_boxed("dispatch").await.unwrap();
        assert_eq!(vec.len(), boxed.dimensions());
    }

    #[test]
    fn test_http_provider_from_config() {
        let config = shoptalk_core::config::EmbeddingConfig {
            provider: "http".to_string(),
            base_url: "https://example.test/v1/".to_string(),
            api_key: "key".to_string(),
            model: "test-model".to_string(),
            dimensions: 8,
        };
        let provider = HttpEmbeddingProvider::new(&config);
        assert_eq!(EmbeddingProvider::dimensions(&provider), 8);
        // Trailing slash is stripped so the endpoint path joins cleanly.
        assert!(format!("{:?}", provider).contains("https://example.test/v1"));
    }
}
