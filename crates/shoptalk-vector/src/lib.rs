//! Shoptalk vector crate - embedding providers, collection-scoped index,
//! retrieval engine, and the document indexer.
//!
//! Provides in-memory vector collections with cosine similarity search, an
//! embedding provider trait with HTTP and mock implementations, a retrieval
//! engine that turns queries into evidence bundles, and the indexer that
//! seeds collections from catalog documents and tabular records.

pub mod embedding;
pub mod index;
pub mod indexer;
pub mod retrieval;

pub use embedding::{DynEmbeddingProvider, EmbeddingProvider, HttpEmbeddingProvider, MockEmbedding};
pub use index::{SearchHit, VectorIndex};
pub use indexer::{CollectionIndexer, IndexReport};
pub use retrieval::RetrievalEngine;
