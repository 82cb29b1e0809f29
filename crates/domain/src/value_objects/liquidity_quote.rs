use super::percentage::Percentage;
use crate::token::TokenAmount;
use serde::{Deserialize, Serialize};

/// Quote for depositing liquidity into a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityQuote {
    /// Token0 actually deposited after ratio adjustment.
    pub token0_amount: TokenAmount,
    /// Token1 actually deposited after ratio adjustment.
    pub token1_amount: TokenAmount,
    /// LP tokens minted for the deposit.
    pub liquidity_tokens: TokenAmount,
    /// Depositor's share of the pool after the deposit.
    pub share_of_pool: Percentage,
    /// Shift of the reserve ratio caused by the deposit, in percent.
    pub price_impact: f64,
}
