//! LP token arithmetic for constant-product pools.

use super::constant_product::mul;
use crate::entities::Pool;
use crate::error::{QuoteError, QuoteResult};
use crate::token::TokenAmount;
use crate::value_objects::Percentage;
use primitive_types::U256;

/// Integer square root by Newton's method, floored.
pub fn isqrt(n: U256) -> U256 {
    if n < U256::from(2u64) {
        return n;
    }
    // 2^ceil(bits/2) is always >= sqrt(n), so the iteration only descends.
    let mut x = U256::one() << n.bits().div_ceil(2);
    loop {
        let y = (x + n / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// LP tokens minted for depositing `amount0`/`amount1` into `pool`.
///
/// The first deposit mints `sqrt(amount0 * amount1)`, which fixes the LP
/// denomination. Later deposits mint the smaller of the two proportional
/// amounts, so an off-ratio deposit is penalized.
pub fn lp_tokens_to_mint(
    pool: &Pool,
    amount0: TokenAmount,
    amount1: TokenAmount,
) -> QuoteResult<TokenAmount> {
    let supply = pool.lp_token_total_supply;
    if pool.is_empty() {
        return Ok(TokenAmount(isqrt(mul(amount0.0, amount1.0)?)));
    }
    if pool.reserve0.is_zero() || pool.reserve1.is_zero() {
        return Err(QuoteError::InsufficientLiquidity(format!(
            "pool {} has supply but empty reserves",
            pool.id
        )));
    }

    let by0 = mul(amount0.0, supply.0)? / pool.reserve0.0;
    let by1 = mul(amount1.0, supply.0)? / pool.reserve1.0;
    Ok(TokenAmount(by0.min(by1)))
}

/// Share of the pool held by `minted` LP tokens once they are added to `supply`.
pub fn share_after_deposit(minted: TokenAmount, supply: TokenAmount) -> QuoteResult<Percentage> {
    if supply.is_zero() {
        return Ok(Percentage::HUNDRED);
    }
    let total = supply
        .checked_add(minted)
        .ok_or_else(|| QuoteError::InvalidAmounts("LP supply overflow".to_string()))?;
    Percentage::from_ratio(minted, total)
}

/// Reserves returned for burning `liquidity` LP tokens, floored.
pub fn proportional_withdrawal(
    pool: &Pool,
    liquidity: TokenAmount,
) -> QuoteResult<(TokenAmount, TokenAmount)> {
    let supply = pool.lp_token_total_supply;
    if pool.is_empty() {
        return Err(QuoteError::ZeroLiquidity(pool.id.to_string()));
    }
    let amount0 = mul(pool.reserve0.0, liquidity.0)? / supply.0;
    let amount1 = mul(pool.reserve1.0, liquidity.0)? / supply.0;
    Ok((TokenAmount(amount0), TokenAmount(amount1)))
}

/// Shift of the reserve ratio `reserve1 / reserve0` caused by a deposit, in percent.
///
/// Zero for a first deposit, where there is no prior ratio.
pub fn deposit_price_impact(pool: &Pool, amount0: TokenAmount, amount1: TokenAmount) -> f64 {
    if pool.reserve0.is_zero() || pool.reserve1.is_zero() {
        return 0.0;
    }
    let before = pool.reserve1.to_f64() / pool.reserve0.to_f64();
    let after = (pool.reserve1.to_f64() + amount1.to_f64())
        / (pool.reserve0.to_f64() + amount0.to_f64());
    ((after - before) / before).abs() * 100.0
}
