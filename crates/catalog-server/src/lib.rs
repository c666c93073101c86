//! HTTP API for the inventory catalog.
//!
//! Thin JSON handlers over [`catalog_core`]: each request runs one engine
//! operation on the blocking pool and maps [`catalog_core::CatalogError`]
//! kinds to status codes. Error bodies are `{"detail": "..."}`.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use router::build_router;
pub use server::{open_store, CatalogServer};
pub use state::AppState;
