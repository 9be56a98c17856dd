//! Collection indexer: embeds documents and upserts them into the index.
//!
//! Seeds the `products` collection from catalog documents and the
//! `shop_info` collection from flattened tabular records. Stored vectors are
//! L2-normalized so that query-time cosine ranking is consistent.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use shoptalk_core::error::ShoptalkError;

use crate::embedding::{DynEmbeddingProvider, EmbeddingProvider};
use crate::index::VectorIndex;
use crate::retrieval::{l2_normalize, TEXT_FIELD};

/// Outcome of seeding one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub stored: usize,
    pub skipped: usize,
}

/// Embeds and stores documents into named collections.
pub struct CollectionIndexer {
    index: Arc<VectorIndex>,
    embedder: Box<dyn DynEmbeddingProvider>,
}

impl CollectionIndexer {
    /// Create a new indexer over a shared index and embedding provider.
    pub fn new(index: Arc<VectorIndex>, embedder: impl EmbeddingProvider + 'static) -> Self {
        Self {
            index,
            embedder: Box::new(embedder),
        }
    }

    /// Create an indexer from a pre-boxed dynamic provider.
    pub fn new_dyn(index: Arc<VectorIndex>, embedder: Box<dyn DynEmbeddingProvider>) -> Self {
        Self { index, embedder }
    }

    /// Embed one document and upsert it into `collection`.
    ///
    /// Whitespace-only documents are skipped rather than stored.
    pub async fn index_document(
        &self,
        collection: &str,
        text: &str,
    ) -> Result<bool, ShoptalkError> {
        if text.trim().is_empty() {
            debug!(collection, "Skipping empty document");
            return Ok(false);
        }

        let mut vector = self.embedder.embed_boxed(text).await?;
        l2_normalize(&mut vector);

        self.index.upsert(
            collection,
            Uuid::new_v4().to_string(),
            vector,
            serde_json::json!({ TEXT_FIELD: text }),
        )?;
        Ok(true)
    }

    /// Index a batch of documents into `collection`.
    pub async fn index_documents(
        &self,
        collection: &str,
        documents: &[String],
    ) -> Result<IndexReport, ShoptalkError> {
        let mut report = IndexReport::default();
        for doc in documents {
            if self.index_document(collection, doc).await? {
                report.stored += 1;
            } else {
                report.skipped += 1;
            }
        }
        info!(
            collection,
            stored = report.stored,
            skipped = report.skipped,
            "Collection seeded"
        );
        Ok(report)
    }

    /// Index tabular records into `collection`, one document per record.
    ///
    /// Each record is flattened to `key: value` lines before embedding.
    pub async fn index_records(
        &self,
        collection: &str,
        records: &[BTreeMap<String, String>],
    ) -> Result<IndexReport, ShoptalkError> {
        let documents: Vec<String> = records.iter().map(flatten_record).collect();
        self.index_documents(collection, &documents).await
    }

    /// Get a reference to the underlying vector index.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

/// Flatten a key/value record to one `key: value` line per field.
///
/// BTreeMap iteration gives a stable field order, so re-indexing an
/// unchanged record produces the same document text.
pub fn flatten_record(record: &BTreeMap<String, String>) -> String {
    record
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
