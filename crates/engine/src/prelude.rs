//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use cpamm_quote_engine::prelude::*;
//! ```

// Batch
pub use crate::batch::{BatchOrchestrator, BatchPolicy};

// Config
pub use crate::config::{ConfigError, DexContracts, EngineConfig, MathSource, VELAR_DEPLOYER};

// Engine
pub use crate::engine::QuoteEngine;

// Quoters
pub use crate::liquidity::{LiquidityQuoteRequest, LiquidityQuoter};
pub use crate::removal::{RANGE_PERCENTAGES, RemovalQuoteRequest, RemovalQuoter};
pub use crate::swap::{RouteQuery, SwapQuoter};

// Math
pub use crate::math::{ChainSwapMath, LocalSwapMath, SwapMath};

// Pools
pub use crate::pool_store::PoolStore;
