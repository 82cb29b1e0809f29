//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use cpamm_quote_chain::prelude::*;
//! ```

// Cache
pub use crate::cache::{CacheConfig, CacheStats, CachedChainQuery};

// Clarity
pub use crate::clarity::{ClarityValue, CodecError, Principal};

// Contracts
pub use crate::contract::ContractId;

// Errors
pub use crate::error::ChainError;

// Node client
pub use crate::hiro::{HiroClient, HiroConfig, MAINNET_API_URL};

// Query
pub use crate::query::{ChainQuery, ChainedRead, FollowUp, ReadCall};
