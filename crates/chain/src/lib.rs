//! Chain access for the quoting engine.
//!
//! This crate provides the read-only "chain query" capability:
//! - Clarity value model and consensus serialization
//! - c32check Stacks addresses and principals
//! - The [`ChainQuery`](query::ChainQuery) trait the engine consumes
//! - An HTTP client for Stacks node `call-read` endpoints
//! - A TTL response cache usable in front of any implementation

/// Prelude module for convenient imports.
pub mod prelude;

/// Response cache.
pub mod cache;
/// Clarity values and codec.
pub mod clarity;
/// Contract identifiers.
pub mod contract;
/// Error types.
pub mod error;
/// Stacks node HTTP client.
pub mod hiro;
/// The chain query trait.
pub mod query;
