//! Quote engine for constant-product DEX pools.
//!
//! This crate turns read-only contract calls into quotes:
//! - Pool lookup by id or token pair
//! - Single and multi-hop swap quotes, exact input or exact output
//! - Liquidity deposit and withdrawal quotes
//! - Strict and lenient batch variants with bounded concurrency

/// Prelude module for convenient imports.
pub mod prelude;

/// Ordered batch fan-out.
pub mod batch;
mod calls;
/// Engine configuration.
pub mod config;
/// Quote engine wiring.
pub mod engine;
/// Deposit quoting.
pub mod liquidity;
/// Swap and deposit amount sources.
pub mod math;
/// Pool lookup.
pub mod pool_store;
/// Withdrawal quoting.
pub mod removal;
/// Swap quoting.
pub mod swap;

#[cfg(test)]
mod testing;
