//! REST API for the quote engine.
//!
//! Exposes pool lookups and swap, deposit and removal quotes as JSON
//! endpoints under `/api/v1`. Token amounts are decimal strings.

/// Prelude module for convenient imports.
pub mod prelude;

/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
