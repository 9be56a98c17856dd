//! Shoptalk API crate - axum HTTP server and route handlers.
//!
//! Exposes the chat endpoint plus read-only history and health endpoints,
//! with a consistent JSON error format across all of them.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
