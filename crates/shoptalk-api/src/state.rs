//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use shoptalk_chat::ChatOrchestrator;
use shoptalk_core::config::ShoptalkConfig;
use shoptalk_vector::VectorIndex;

/// Shared application state, passed to handlers via axum's State extractor.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ShoptalkConfig>,
    /// The chat pipeline coordinator.
    pub orchestrator: Arc<ChatOrchestrator>,
    /// The vector index, exposed for health reporting.
    pub index: Arc<VectorIndex>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState from wired components.
    pub fn new(
        config: ShoptalkConfig,
        orchestrator: ChatOrchestrator,
        index: Arc<VectorIndex>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            index,
            start_time: Instant::now(),
        }
    }
}
