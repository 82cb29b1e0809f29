//! Domain model for constant-product DEX quoting.
//!
//! This crate holds the value types exchanged by the quoting engine:
//! - Pools, pool ids and fee ratios
//! - Token identifiers and 256-bit token amounts
//! - Swap, liquidity and removal quotes
//! - The error taxonomy every operation reports into
//! - Reference integer math for swaps and LP tokens

/// Pool entities.
pub mod entities;
/// Error taxonomy.
pub mod error;
/// Constant-product and LP token math.
pub mod math;
/// Token identifiers and amounts.
pub mod token;
/// Quote value objects.
pub mod value_objects;

pub use entities::{FeeRatio, Pool, PoolId};
pub use error::{ErrorKind, QuoteError, QuoteResult};
pub use token::{TokenAmount, TokenId};
pub use value_objects::{LiquidityQuote, Percentage, RemovalQuote, SwapQuote};
