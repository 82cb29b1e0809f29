use crate::entities::FeeRatio;
use crate::error::{QuoteError, QuoteResult};
use crate::token::TokenAmount;
use primitive_types::U256;

fn overflow() -> QuoteError {
    QuoteError::InvalidAmounts("arithmetic overflow".to_string())
}

pub(crate) fn mul(a: U256, b: U256) -> QuoteResult<U256> {
    a.checked_mul(b).ok_or_else(overflow)
}

fn add(a: U256, b: U256) -> QuoteResult<U256> {
    a.checked_add(b).ok_or_else(overflow)
}

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula: dy = y * dx * (den - num) / (x * den + dx * (den - num))
///
/// The fee is applied by scaling rather than by flooring `dx * (1 - fee)`
/// first, which matches the on-chain library bit for bit.
pub fn amount_out(
    amount_in: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    fee: FeeRatio,
) -> QuoteResult<TokenAmount> {
    if amount_in.is_zero() {
        return Err(QuoteError::InvalidAmounts(
            "amount in must be positive".to_string(),
        ));
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(QuoteError::InsufficientLiquidity(
            "pool reserves are empty".to_string(),
        ));
    }

    let (kept, den) = fee.retained();
    let amount_in_with_fee = mul(amount_in.0, U256::from(kept))?;
    let numerator = mul(amount_in_with_fee, reserve_out.0)?;
    let denominator = add(mul(reserve_in.0, U256::from(den))?, amount_in_with_fee)?;

    Ok(TokenAmount(numerator / denominator))
}

/// Calculates the input needed to receive exactly `amount_out`.
///
/// formula: dx = x * dy * den / ((y - dy) * (den - num)) + 1
pub fn amount_in(
    amount_out: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    fee: FeeRatio,
) -> QuoteResult<TokenAmount> {
    if amount_out.is_zero() {
        return Err(QuoteError::InvalidAmounts(
            "amount out must be positive".to_string(),
        ));
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(QuoteError::InsufficientLiquidity(
            "pool reserves are empty".to_string(),
        ));
    }
    if amount_out >= reserve_out {
        return Err(QuoteError::InsufficientLiquidity(format!(
            "requested {amount_out} but pool holds {reserve_out}"
        )));
    }

    let (kept, den) = fee.retained();
    if kept == 0 {
        return Err(QuoteError::InsufficientLiquidity(
            "fee consumes the whole input".to_string(),
        ));
    }
    let numerator = mul(mul(reserve_in.0, amount_out.0)?, U256::from(den))?;
    let denominator = mul(reserve_out.0 - amount_out.0, U256::from(kept))?;

    Ok(TokenAmount(add(numerator / denominator, U256::one())?))
}

/// Deposit amounts that keep the pool ratio, as the router computes them.
///
/// An empty pool accepts the desired amounts as they are.
pub fn optimal_deposit(
    desired0: TokenAmount,
    desired1: TokenAmount,
    reserve0: TokenAmount,
    reserve1: TokenAmount,
) -> QuoteResult<(TokenAmount, TokenAmount)> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Ok((desired0, desired1));
    }

    let optimal1 = mul(desired0.0, reserve1.0)? / reserve0.0;
    if optimal1 <= desired1.0 {
        return Ok((desired0, TokenAmount(optimal1)));
    }

    let optimal0 = mul(desired1.0, reserve0.0)? / reserve1.0;
    Ok((TokenAmount(optimal0), desired1))
}

/// Price impact of a swap in percent:
/// `|((out / in) - (reserve_out / reserve_in)) / (reserve_out / reserve_in)| * 100`.
///
/// Display-only, so `f64` precision is acceptable. Returns `0.0` when a
/// ratio is undefined.
pub fn price_impact(
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
) -> f64 {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return 0.0;
    }
    let execution = amount_out.to_f64() / amount_in.to_f64();
    let spot = reserve_out.to_f64() / reserve_in.to_f64();
    ((execution - spot) / spot).abs() * 100.0
}
