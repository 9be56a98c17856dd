use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, ShoptalkError};

/// Top-level configuration for the Shoptalk service.
///
/// Loaded from `shoptalk.toml` by default. Each section corresponds to one
/// subsystem; credentials and model selection live here rather than in
/// ambient environment variables so that adapters receive them explicitly
/// at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoptalkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for ShoptalkConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            chat: ChatConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ShoptalkConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ShoptalkConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ShoptalkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            log_level: "info".to_string(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider backend: "http" or "mock".
    pub provider: String,
    /// Base URL of an OpenAI-compatible embeddings endpoint.
    pub base_url: String,
    /// API key for the embeddings endpoint.
    pub api_key: String,
    /// Embedding model name.
    pub model: String,
    /// Expected vector dimensionality. Must match the dimensionality used
    /// when documents were indexed.
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Generation collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Generator backend: "http" or "echo".
    pub provider: String,
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
    /// API key for the generation endpoint.
    pub api_key: String,
    /// Generation model name.
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "echo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Retrieval engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest neighbors fetched per query.
    pub top_k: usize,
    /// Vector collection holding product documents.
    pub product_collection: String,
    /// Vector collection holding shop-information records.
    pub shop_info_collection: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            product_collection: "products".to_string(),
            shop_info_collection: "shop_info".to_string(),
        }
    }
}

/// Chat orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Overall per-request deadline covering routing, retrieval, and
    /// generation combined, in seconds.
    pub request_timeout_secs: u64,
    /// Handler that receives ambiguous queries: "product" or "shop_info".
    pub default_handler: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            default_handler: "product".to_string(),
        }
    }
}

/// Catalog seeding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON-lines file of product documents, one `{"information": ...}` per
    /// line. Empty means no product seeding at startup.
    pub products_path: String,
    /// TOML file of shop-information records (array of tables under
    /// `[[record]]`). Empty means no shop-info seeding at startup.
    pub shop_info_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_path: String::new(),
            shop_info_path: String::new(),
        }
    }
}
