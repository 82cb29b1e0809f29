use crate::error::{QuoteError, QuoteResult};
use crate::token::{TokenAmount, TokenId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

const BPS_DENOMINATOR: u64 = 10_000;

/// Quote for a single- or multi-hop swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    /// Tokens traversed, first is sold, last is bought.
    pub route: Vec<TokenId>,
    pub amount_in: TokenAmount,
    pub amount_out: TokenAmount,
    /// Deviation of the execution price from spot, in percent.
    pub price_impact: f64,
}

impl SwapQuote {
    /// Number of pools crossed.
    pub fn hops(&self) -> usize {
        self.route.len().saturating_sub(1)
    }

    /// Lowest acceptable output under `slippage_bps` tolerance, floored.
    pub fn minimum_received(&self, slippage_bps: u32) -> QuoteResult<TokenAmount> {
        let bps = check_slippage(slippage_bps)?;
        let kept = U256::from(BPS_DENOMINATOR - bps);
        Ok(TokenAmount(
            self.amount_out.as_u256() * kept / U256::from(BPS_DENOMINATOR),
        ))
    }

    /// Highest acceptable input under `slippage_bps` tolerance, rounded up.
    pub fn maximum_sent(&self, slippage_bps: u32) -> QuoteResult<TokenAmount> {
        let bps = check_slippage(slippage_bps)?;
        let denominator = U256::from(BPS_DENOMINATOR);
        let numerator = self
            .amount_in
            .as_u256()
            .checked_mul(U256::from(BPS_DENOMINATOR + bps))
            .ok_or_else(|| QuoteError::InvalidAmounts("slippage overflow".to_string()))?;
        let (quotient, remainder) = numerator.div_mod(denominator);
        let rounded = if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::one()
        };
        Ok(TokenAmount(rounded))
    }
}

fn check_slippage(slippage_bps: u32) -> QuoteResult<u64> {
    let bps = u64::from(slippage_bps);
    if bps > BPS_DENOMINATOR {
        return Err(QuoteError::InvalidAmounts(format!(
            "slippage {slippage_bps} bps exceeds 100%"
        )));
    }
    Ok(bps)
}
