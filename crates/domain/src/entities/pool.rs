use crate::error::{QuoteError, QuoteResult};
use crate::token::{TokenAmount, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pool identifier as assigned by the core contract.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form used as the Clarity `uint` key, if the id is numeric.
    pub fn as_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl From<u128> for PoolId {
    fn from(id: u128) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for PoolId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fee expressed as `numerator / denominator` of the input amount.
///
/// Deserialization goes through [`FeeRatio::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFeeRatio")]
pub struct FeeRatio {
    numerator: u128,
    denominator: u128,
}

#[derive(Deserialize)]
struct RawFeeRatio {
    numerator: u128,
    denominator: u128,
}

impl TryFrom<RawFeeRatio> for FeeRatio {
    type Error = QuoteError;

    fn try_from(raw: RawFeeRatio) -> Result<Self, Self::Error> {
        FeeRatio::new(raw.numerator, raw.denominator)
    }
}

impl FeeRatio {
    /// Creates a fee ratio, rejecting a zero denominator or a fee above 100%.
    pub fn new(numerator: u128, denominator: u128) -> QuoteResult<Self> {
        if denominator == 0 {
            return Err(QuoteError::InvalidAmounts(
                "fee denominator must be non-zero".to_string(),
            ));
        }
        if numerator > denominator {
            return Err(QuoteError::InvalidAmounts(format!(
                "fee {numerator}/{denominator} exceeds 100%"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// Share of the input that survives the fee, as `(den - num, den)`.
    pub fn retained(&self) -> (u128, u128) {
        (self.denominator - self.numerator, self.denominator)
    }
}

/// Immutable snapshot of a constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub token0: TokenId,
    pub token1: TokenId,
    pub lp_token: TokenId,
    pub reserve0: TokenAmount,
    pub reserve1: TokenAmount,
    pub lp_token_total_supply: TokenAmount,
    pub swap_fee: FeeRatio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_fee: Option<FeeRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_fee: Option<FeeRatio>,
}

impl Pool {
    /// Returns `(reserve_in, reserve_out)` for a trade selling `token_in`.
    pub fn reserves_for(&self, token_in: &TokenId) -> QuoteResult<(TokenAmount, TokenAmount)> {
        if token_in == &self.token0 {
            Ok((self.reserve0, self.reserve1))
        } else if token_in == &self.token1 {
            Ok((self.reserve1, self.reserve0))
        } else {
            Err(QuoteError::InvalidPath(format!(
                "token {token_in} is not part of pool {}",
                self.id
            )))
        }
    }

    /// Spot price of `token_in` in units of the other token
    /// (`reserve_out / reserve_in`). `None` for an empty pool.
    pub fn spot_price(&self, token_in: &TokenId) -> Option<f64> {
        let (reserve_in, reserve_out) = self.reserves_for(token_in).ok()?;
        if reserve_in.is_zero() {
            return None;
        }
        Some(reserve_out.to_f64() / reserve_in.to_f64())
    }

    /// True before the first deposit.
    pub fn is_empty(&self) -> bool {
        self.lp_token_total_supply.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Pool {
        Pool {
            id: PoolId::from(3u128),
            token0: TokenId::from("SP1.wstx"),
            token1: TokenId::from("SP2.usda"),
            lp_token: TokenId::from("SP1.lp-3"),
            reserve0: TokenAmount::from(1_000_000u64),
            reserve1: TokenAmount::from(2_000_000u64),
            lp_token_total_supply: TokenAmount::from(1_414_213u64),
            swap_fee: FeeRatio::new(30, 10_000).unwrap(),
            protocol_fee: None,
            share_fee: None,
        }
    }

    #[test]
    fn test_reserves_follow_token_in() {
        let p = pool();
        let (rin, rout) = p.reserves_for(&TokenId::from("SP2.usda")).unwrap();
        assert_eq!(rin, TokenAmount::from(2_000_000u64));
        assert_eq!(rout, TokenAmount::from(1_000_000u64));
        assert!(p.reserves_for(&TokenId::from("SP3.other")).is_err());
    }

    #[test]
    fn test_spot_price() {
        let p = pool();
        assert_eq!(p.spot_price(&TokenId::from("SP1.wstx")), Some(2.0));
        assert_eq!(p.spot_price(&TokenId::from("SP2.usda")), Some(0.5));
    }

    #[test]
    fn test_fee_ratio_validation() {
        assert!(FeeRatio::new(1, 0).is_err());
        assert!(FeeRatio::new(11, 10).is_err());
        let fee = FeeRatio::new(30, 10_000).unwrap();
        assert_eq!(fee.retained(), (9_970, 10_000));
    }

    #[test]
    fn test_fee_ratio_deserialize_is_validated() {
        let fee: FeeRatio =
            serde_json::from_str(r#"{"numerator":30,"denominator":10000}"#).unwrap();
        assert_eq!(fee.numerator(), 30);
        assert_eq!(fee.denominator(), 10_000);

        assert!(serde_json::from_str::<FeeRatio>(r#"{"numerator":11,"denominator":10}"#).is_err());
        assert!(serde_json::from_str::<FeeRatio>(r#"{"numerator":0,"denominator":0}"#).is_err());
    }

    #[test]
    fn test_pool_id_numeric() {
        assert_eq!(PoolId::from("12").as_u128(), Some(12));
        assert_eq!(PoolId::from("abc").as_u128(), None);
    }
}
