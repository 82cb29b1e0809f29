use crate::error::{QuoteError, QuoteResult};
use crate::token::TokenAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fixed-point scale applied before integer division.
const SHARE_SCALE: u64 = 1_000_000;
/// Decimal places kept by [`Percentage`].
const SHARE_DECIMALS: u32 = 6;

/// Percentage in the range `0..=100` with six decimal places.
///
/// Serialized as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(pub Decimal);

impl Percentage {
    pub const HUNDRED: Self = Self(Decimal::ONE_HUNDRED);
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// `part * 100 / whole`, floored at six decimal places.
    ///
    /// The scaling happens on the integers so reserves far beyond `f64`
    /// precision still produce an exact result.
    pub fn from_ratio(part: TokenAmount, whole: TokenAmount) -> QuoteResult<Self> {
        if whole.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "share denominator is zero".to_string(),
            ));
        }
        let scaled = part
            .as_u256()
            .checked_mul(U256::from(100u64 * SHARE_SCALE))
            .ok_or_else(|| QuoteError::InvalidAmounts("share computation overflow".to_string()))?
            / whole.as_u256();
        if scaled > U256::from(i64::MAX as u64) {
            return Err(QuoteError::InvalidAmounts(
                "share exceeds representable range".to_string(),
            ));
        }
        Ok(Self(Decimal::new(scaled.low_u64() as i64, SHARE_DECIMALS)))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Decimal::from_f64(raw)
            .map(|d| Self(d.round_dp(SHARE_DECIMALS)))
            .ok_or_else(|| serde::de::Error::custom("percentage out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_ratio_six_decimals() {
        let share =
            Percentage::from_ratio(TokenAmount::from(1u64), TokenAmount::from(3u64)).unwrap();
        assert_eq!(share.value(), dec!(33.333333));
    }

    #[test]
    fn test_from_ratio_full() {
        let share =
            Percentage::from_ratio(TokenAmount::from(500u64), TokenAmount::from(500u64)).unwrap();
        assert_eq!(share, Percentage::HUNDRED);
    }

    #[test]
    fn test_from_ratio_huge_integers() {
        let whole: TokenAmount = "300000000000000000000000000000000000000".parse().unwrap();
        let part: TokenAmount = "100000000000000000000000000000000000000".parse().unwrap();
        let share = Percentage::from_ratio(part, whole).unwrap();
        assert_eq!(share.value(), dec!(33.333333));
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(Percentage::from_ratio(TokenAmount::from(1u64), TokenAmount::zero()).is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let share =
            Percentage::from_ratio(TokenAmount::from(1u64), TokenAmount::from(8u64)).unwrap();
        assert_eq!(serde_json::to_string(&share).unwrap(), "12.5");
    }
}
