//! Retrieval engine combining embedding generation with collection search.
//!
//! Turns a raw query into an ordered [`EvidenceBundle`]: embed, L2-normalize,
//! query the collection for the k nearest neighbors, and map stored metadata
//! into ranked hits. Embedding and index failures get one bounded retry
//! before the error propagates.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use shoptalk_core::error::ShoptalkError;
use shoptalk_core::types::{EvidenceBundle, RetrievalHit};

use crate::embedding::{DynEmbeddingProvider, EmbeddingProvider};
use crate::index::{SearchHit, VectorIndex};

/// The metadata field holding a document's canonical text.
pub const TEXT_FIELD: &str = "information";

/// Delay before the single embedding retry.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Retrieval engine scoped over the shared vector index.
///
/// Uses dynamic dispatch (`Box<dyn DynEmbeddingProvider>`) so that
/// production code can supply `HttpEmbeddingProvider` while tests use
/// `MockEmbedding`.
pub struct RetrievalEngine {
    index: Arc<VectorIndex>,
    embedder: Box<dyn DynEmbeddingProvider>,
}

impl RetrievalEngine {
    /// Create a new retrieval engine with a shared index and embedding
    /// provider.
    pub fn new(index: Arc<VectorIndex>, embedder: impl EmbeddingProvider + 'static) -> Self {
        Self {
            index,
            embedder: Box::new(embedder),
        }
    }

    /// Create a retrieval engine from a pre-boxed dynamic provider.
    pub fn new_dyn(index: Arc<VectorIndex>, embedder: Box<dyn DynEmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    /// Search a collection for the top `k` documents relevant to `query`.
    ///
    /// Hit scores are non-increasing by rank; fewer than `k` documents in
    /// the collection is not an error. Embedding and index failures
    /// propagate after one retry.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<EvidenceBundle, ShoptalkError> {
        let hits = match self.embed_and_query(query, collection, k).await {
            Ok(hits) => hits,
            Err(first) => {
                warn!(error = %first, "Retrieval failed, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.embed_and_query(query, collection, k).await?
            }
        };

        let bundle = EvidenceBundle::new(
            hits.into_iter()
                .enumerate()
                .map(|(rank, hit)| RetrievalHit {
                    text: hit
                        .metadata
                        .get(TEXT_FIELD)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    score: hit.score,
                    rank,
                })
                .collect(),
        );

        debug!(
            collection,
            k,
            hits = bundle.len(),
            top_score = bundle.hits.first().map(|h| h.score),
            "Retrieval complete"
        );

        Ok(bundle)
    }

    /// One retrieval attempt: embed the query, normalize, query the index.
    async fn embed_and_query(
        &self,
        query: &str,
        collection: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>, ShoptalkError> {
        let mut vector = self.embedder.embed_boxed(query).await?;
        l2_normalize(&mut vector);
        self.index.search(collection, &vector, k)
    }

    /// Get a reference to the underlying vector index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

/// Scale a vector to unit length in place. Zero vectors are left unchanged.
pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbedding;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedding provider that fails a configurable number of times before
    /// delegating to MockEmbedding.
    struct FlakyEmbedding {
        failures: AtomicUsize,
        inner: MockEmbedding,
    }

    impl FlakyEmbedding {
        fn failing(times: usize) -> Self {
            Self {
                failures: AtomicUsize::new(times),
                inner: MockEmbedding::new(),
            }
        }
    }

    impl EmbeddingProvider for FlakyEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ShoptalkError> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ShoptalkError::Embedding("transient failure".to_string()));
            }
            self.inner.embed(text).await
        }

        fn dimensions(&self) -> usize {
            EmbeddingProvider::dimensions(&self.inner)
        }
    }

    async fn seed(engine: &RetrievalEngine, collection: &str, docs: &[&str]) {
        let embedder = MockEmbedding::new();
        for (i, doc) in docs.iter().enumerate() {
            let mut v = embedder.embed(doc).await.unwrap();
            l2_normalize(&mut v);
            engine
                .index()
                .upsert(
                    collection,
                    format!("doc{}", i),
                    v,
                    serde_json::json!({ TEXT_FIELD: doc }),
                )
                .unwrap();
        }
    }

    fn make_engine() -> RetrievalEngine {
        RetrievalEngine::new(Arc::new(VectorIndex::new()), MockEmbedding::new())
    }

    #[tokio::test]
    async fn test_search_empty_collection() {
        let engine = make_engine();
        let bundle = engine.search("anything", "products", 3).await.unwrap();
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn test_search_finds_exact_document() {
        let engine = make_engine();
        seed(
            &engine,
            "products",
            &[
                "Nokia 3210 4G price 1,590,000 VND",
                "Samsung Galaxy A05s colors black blue silver",
            ],
        )
        .await;

        let bundle = engine
            .search("Nokia 3210 4G price 1,590,000 VND", "products", 3)
            .await
            .unwrap();

        assert_eq!(bundle.len(), 2);
        assert!(bundle.hits[0].text.contains("Nokia 3210 4G"));
        assert!((bundle.hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_scores_non_increasing_and_ranks_sequential() {
        let engine = make_engine();
        seed(
            &engine,
            "products",
            &["alpha document", "beta document", "gamma document"],
        )
        .await;

        let bundle = engine.search("alpha document", "products", 3).await.unwrap();
        assert_eq!(bundle.len(), 3);
        for (i, hit) in bundle.hits.iter().enumerate() {
            assert_eq!(hit.rank, i);
        }
        for pair in bundle.hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_search_bounded_by_k() {
        let engine = make_engine();
        seed(&engine, "products", &["a", "b", "c", "d", "e"]).await;

        let bundle = engine.search("a", "products", 2).await.unwrap();
        assert_eq!(bundle.len(), 2);
    }

    #[tokio::test]
    async fn test_search_idempotent() {
        let engine = make_engine();
        seed(&engine, "products", &["one", "two", "three"]).await;

        let first = engine.search("two", "products", 3).await.unwrap();
        let second = engine.search("two", "products", 3).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_collection_scoping() {
        let engine = make_engine();
        seed(&engine, "products", &["phone specs"]).await;
        seed(&engine, "shop_info", &["opening hours 9am to 9pm"]).await;

        let bundle = engine.search("opening hours", "shop_info", 3).await.unwrap();
        assert_eq!(bundle.len(), 1);
        assert!(bundle.hits[0].text.contains("opening hours"));
    }

    #[tokio::test]
    async fn test_single_embedding_failure_is_retried() {
        // The retry repeats the whole attempt, so the second pass still
        // embeds and queries and returns real hits.
        let engine =
            RetrievalEngine::new(Arc::new(VectorIndex::new()), FlakyEmbedding::failing(1));
        seed(&engine, "products", &["alpha document"]).await;

        let bundle = engine.search("alpha document", "products", 3).await.unwrap();
        assert_eq!(bundle.len(), 1);
        assert!(bundle.hits[0].text.contains("alpha"));
    }

    #[tokio::test]
    async fn test_persistent_embedding_failure_propagates() {
        let engine =
            RetrievalEngine::new(Arc::new(VectorIndex::new()), FlakyEmbedding::failing(2));
        let result = engine.search("query", "products", 3).await;
        assert!(matches!(result, Err(ShoptalkError::Embedding(_))));
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0f32; 4];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0f32; 4]);
    }
}
