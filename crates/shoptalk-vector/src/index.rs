//! In-memory vector index with named collections and brute-force cosine
//! similarity search.
//!
//! Each collection is a logically isolated namespace scoped to one knowledge
//! domain. Search is O(n) per collection, which is acceptable for catalog
//! sized datasets; entries are kept in insertion order so that equal-score
//! ties rank in the order documents were added.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use shoptalk_core::error::ShoptalkError;

/// A single hit returned from a vector search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The ID of the matching entry.
    pub id: String,
    /// Cosine similarity score, in [-1, 1].
    pub score: f32,
    /// Metadata associated with the entry.
    pub metadata: Value,
}

/// An entry stored in a collection.
#[derive(Debug, Clone)]
struct VectorEntry {
    id: String,
    embedding: Vec<f32>,
    metadata: Value,
}

/// In-memory vector index using brute-force cosine similarity.
///
/// Thread-safe via interior RwLock; shared read-only across concurrent
/// request tasks, mutated only at seeding time.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    collections: Arc<RwLock<HashMap<String, Vec<VectorEntry>>>>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a vector with associated metadata in a collection.
    ///
    /// An existing entry with the same ID keeps its position in the
    /// insertion order; the collection is created on first upsert.
    pub fn upsert(
        &self,
        collection: &str,
        id: impl Into<String>,
        embedding: Vec<f32>,
        metadata: Value,
    ) -> Result<(), ShoptalkError> {
        let id = id.into();
        let mut collections = self
            .collections
            .write()
            .map_err(|e| ShoptalkError::Index(format!("Lock poisoned: {}", e)))?;
        let entries = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = entries.iter_mut().find(|e| e.id == id) {
            existing.embedding = embedding;
            existing.metadata = metadata;
        } else {
            entries.push(VectorEntry {
                id,
                embedding,
                metadata,
            });
        }
        Ok(())
    }

    /// Search a collection for the k nearest neighbors by cosine similarity.
    ///
    /// Returns results sorted by descending score; ties keep insertion
    /// order (the sort is stable). An unknown collection yields no hits,
    /// and a collection with fewer than `k` entries yields them all.
    pub fn search(
        &self,
        collection: &str,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<SearchHit>, ShoptalkError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| ShoptalkError::Index(format!("Lock poisoned: {}", e)))?;

        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<SearchHit> = entries
            .iter()
            .map(|entry| SearchHit {
                id: entry.id.clone(),
                score: cosine_similarity(query, &entry.embedding),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Return the number of vectors in one collection.
    pub fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Return the total number of vectors across all collections.
    pub fn len(&self) -> usize {
        self.collections
            .read()
            .map(|c| c.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Return true if the index contains no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();

    let mag_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(dir: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; 8];
        v[dir] = 1.0;
        v
    }

    #[test]
    fn test_upsert_and_search() {
        let index = VectorIndex::new();

        index
            .upsert("products", "a", unit(0), serde_json::json!({"information": "doc a"}))
            .unwrap();
        index
            .upsert("products", "b", unit(1), serde_json::json!({"information": "doc b"}))
            .unwrap();

        assert_eq!(index.collection_len("products"), 2);

        let hits = index.search("products", &unit(0), 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_collections_are_isolated() {
        let index = VectorIndex::new();
        index
            .upsert("products", "p1", unit(0), serde_json::json!({}))
            .unwrap();
        index
            .upsert("shop_info", "s1", unit(0), serde_json::json!({}))
            .unwrap();

        let hits = index.search("products", &unit(0), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p1");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_search_unknown_collection() {
        let index = VectorIndex::new();
        let hits = index.search("missing", &unit(0), 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_search_respects_k_limit() {
        let index = VectorIndex::new();
        for i in 0..10 {
            index
                .upsert("products", format!("id{}", i), unit(0), serde_json::json!({}))
                .unwrap();
        }

        let hits = index.search("products", &unit(0), 3).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_fewer_entries_than_k() {
        let index = VectorIndex::new();
        index
            .upsert("products", "only", unit(0), serde_json::json!({}))
            .unwrap();
        let hits = index.search("products", &unit(0), 3).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::new();
        // Identical embeddings: all score the same against any query.
        for id in ["first", "second", "third"] {
            index
                .upsert("products", id, unit(2), serde_json::json!({}))
                .unwrap();
        }

        let hits = index.search("products", &unit(2), 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let index = VectorIndex::new();
        index
            .upsert("products", "a", unit(0), serde_json::json!({"v": 1}))
            .unwrap();
        index
            .upsert("products", "b", unit(1), serde_json::json!({}))
            .unwrap();
        index
            .upsert("products", "a", unit(3), serde_json::json!({"v": 2}))
            .unwrap();

        assert_eq!(index.collection_len("products"), 2);
        let hits = index.search("products", &unit(3), 1).unwrap();
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].metadata["v"], 2);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0f32; 100];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert!(cosine_similarity(&unit(0), &unit(1)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0f32; 16];
        let b = vec![-1.0f32; 16];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let zero = vec![0.0f32; 8];
        assert_eq!(cosine_similarity(&zero, &unit(0)), 0.0);
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0; 4], &[1.0; 8]), 0.0);
    }

    #[test]
    fn test_is_empty() {
        let index = VectorIndex::new();
        assert!(index.is_empty());
        index
            .upsert("products", "x", unit(0), serde_json::json!({}))
            .unwrap();
        assert!(!index.is_empty());
    }
}
