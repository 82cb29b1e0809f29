//! Integer math for constant-product pools.
//!
//! Amounts are `U256`, divisions are floor divisions.

pub mod constant_product;
pub mod liquidity;

pub use constant_product::{amount_in, amount_out, optimal_deposit, price_impact};
pub use liquidity::{
    deposit_price_impact, isqrt, lp_tokens_to_mint, proportional_withdrawal, share_after_deposit,
};
