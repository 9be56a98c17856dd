//! Shoptalk core crate - shared types, configuration, and error taxonomy.
//!
//! Every other crate in the workspace depends on this one. It defines the
//! domain vocabulary (messages, handler ids, retrieval hits), the top-level
//! error type, and the TOML-backed configuration tree.

pub mod config;
pub mod error;
pub mod types;
