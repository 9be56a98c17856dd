//! CLI argument definitions for the Shoptalk server binary.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Shoptalk — an intent-routed retrieval chat service for a phone store.
#[derive(Parser, Debug)]
#[command(name = "shoptalk", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// JSON-lines product catalog to seed at startup.
    #[arg(long = "products")]
    pub products: Option<PathBuf>,

    /// TOML shop-information snapshot to seed at startup.
    #[arg(long = "shop-info")]
    pub shop_info: Option<PathBuf>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SHOPTALK_CONFIG env var > ./shoptalk.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SHOPTALK_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("shoptalk.toml")
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > SHOPTALK_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("SHOPTALK_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}
