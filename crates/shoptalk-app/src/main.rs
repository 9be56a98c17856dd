//! Shoptalk server binary - composition root.
//!
//! Ties together the Shoptalk crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the embedding provider and generation collaborator
//! 3. Seed the vector collections from the product catalog and the
//!    shop-information snapshot
//! 4. Wire the retrieval engine, specialists, router, store, and
//!    orchestrator
//! 5. Start the axum HTTP server

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use shoptalk_api::{routes, AppState};
use shoptalk_chat::{
    ChatOrchestrator, DomainSpecialist, EchoGenerator, FileTableSource, Generator, HttpGenerator,
    IntentRouter, MemoryConversationStore, SpecialistRegistry, TabularSource,
};
use shoptalk_core::config::ShoptalkConfig;
use shoptalk_core::error::ShoptalkError;
use shoptalk_core::types::HandlerId;
use shoptalk_vector::embedding::DynEmbeddingProvider;
use shoptalk_vector::{
    CollectionIndexer, HttpEmbeddingProvider, MockEmbedding, RetrievalEngine, VectorIndex,
};

use cli::CliArgs;

/// Build an embedding provider from the configured backend name.
fn build_embedder(config: &ShoptalkConfig) -> Result<Box<dyn DynEmbeddingProvider>, ShoptalkError> {
    match config.embedding.provider.as_str() {
        "http" => Ok(Box::new(HttpEmbeddingProvider::new(&config.embedding))),
        "mock" => Ok(Box::new(MockEmbedding::new())),
        other => Err(ShoptalkError::Config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

/// Build a generation collaborator from the configured backend name.
fn build_generator(config: &ShoptalkConfig) -> Result<Arc<dyn Generator>, ShoptalkError> {
    match config.generation.provider.as_str() {
        "http" => Ok(Arc::new(HttpGenerator::new(&config.generation))),
        "echo" => Ok(Arc::new(EchoGenerator::new())),
        other => Err(ShoptalkError::Config(format!(
            "Unknown generation provider: {}",
            other
        ))),
    }
}

/// Load product documents from a JSON-lines catalog file.
///
/// Each non-empty line is an object with an `information` field holding the
/// document text. Lines without it are skipped with a warning.
fn load_product_documents(path: &Path) -> Result<Vec<String>, ShoptalkError> {
    let content = std::fs::read_to_string(path)?;
    let mut documents = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)?;
        match value.get("information").and_then(|v| v.as_str()) {
            Some(text) => documents.push(text.to_string()),
            None => tracing::warn!(
                path = %path.display(),
                line = lineno + 1,
                "Catalog line has no information field, skipping"
            ),
        }
    }

    Ok(documents)
}

/// Seed the vector collections from the configured catalog files.
async fn seed_collections(
    indexer: &CollectionIndexer,
    config: &ShoptalkConfig,
) -> Result<(), ShoptalkError> {
    if !config.catalog.products_path.is_empty() {
        let documents = load_product_documents(Path::new(&config.catalog.products_path))?;
        indexer
            .index_documents(&config.retrieval.product_collection, &documents)
            .await?;
    } else {
        tracing::warn!("No product catalog configured, products collection starts empty");
    }

    if !config.catalog.shop_info_path.is_empty() {
        let source = FileTableSource::new(&config.catalog.shop_info_path);
        let records = source.records()?;
        indexer
            .index_records(&config.retrieval.shop_info_collection, &records)
            .await?;
    } else {
        tracing::warn!("No shop-info snapshot configured, shop_info collection starts empty");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ShoptalkConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    config.general.log_level = args.resolve_log_level(&config.general.log_level);
    if let Some(ref p) = args.products {
        config.catalog.products_path = p.to_string_lossy().to_string();
    }
    if let Some(ref p) = args.shop_info {
        config.catalog.shop_info_path = p.to_string_lossy().to_string();
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Shoptalk v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Vector index (single shared instance) and seeding.
    let index = Arc::new(VectorIndex::new());
    let indexer = CollectionIndexer::new_dyn(Arc::clone(&index), build_embedder(&config)?);
    seed_collections(&indexer, &config).await?;
    tracing::info!(documents = index.len(), "Vector index seeded");

    // Retrieval and specialists.
    let engine = Arc::new(RetrievalEngine::new_dyn(
        Arc::clone(&index),
        build_embedder(&config)?,
    ));
    let generator = build_generator(&config)?;

    let mut registry = SpecialistRegistry::new();
    registry.register(Arc::new(DomainSpecialist::product(
        config.retrieval.product_collection.clone(),
        config.retrieval.top_k,
        Arc::clone(&engine),
        Arc::clone(&generator),
    )));
    registry.register(Arc::new(DomainSpecialist::shop_info(
        config.retrieval.shop_info_collection.clone(),
        config.retrieval.top_k,
        engine,
        generator,
    )));

    // Router and orchestrator.
    let default_handler = match config.chat.default_handler.parse::<HandlerId>() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to product as default handler");
            HandlerId::Product
        }
    };
    let orchestrator = ChatOrchestrator::new(
        IntentRouter::new(default_handler),
        registry,
        Arc::new(MemoryConversationStore::new()),
        &config.chat,
    );

    // HTTP server.
    let state = AppState::new(config, orchestrator, index);
    routes::start_server(state).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_product_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"information": "Nokia 3210 4G, 1,590,000 VND"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"information": "Samsung Galaxy A16"}}"#).unwrap();

        let docs = load_product_documents(file.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].contains("Nokia"));
    }

    #[test]
    fn test_load_product_documents_skips_missing_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "no information field"}}"#).unwrap();
        writeln!(file, r#"{{"information": "kept"}}"#).unwrap();

        let docs = load_product_documents(file.path()).unwrap();
        assert_eq!(docs, vec!["kept".to_string()]);
    }

    #[test]
    fn test_load_product_documents_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(load_product_documents(file.path()).is_err());
    }

    #[test]
    fn test_build_embedder_unknown_provider() {
        let mut config = ShoptalkConfig::default();
        config.embedding.provider = "onnx".to_string();
        assert!(build_embedder(&config).is_err());
    }

    #[test]
    fn test_build_generator_known_providers() {
        let mut config = ShoptalkConfig::default();
        assert!(build_generator(&config).is_ok());
        config.generation.provider = "http".to_string();
        assert!(build_generator(&config).is_ok());
        config.generation.provider = "llama".to_string();
        assert!(build_generator(&config).is_err());
    }
}
