use super::percentage::Percentage;
use crate::token::TokenAmount;
use serde::{Deserialize, Serialize};

/// Quote for burning LP tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalQuote {
    pub token0_amount: TokenAmount,
    pub token1_amount: TokenAmount,
    /// Share of the LP supply being burned.
    pub share_of_pool: Percentage,
    /// Requested fraction of a position, set by range quotes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
}

impl RemovalQuote {
    /// Tags the quote with the fraction it was generated for.
    #[must_use]
    pub fn with_percentage(mut self, percentage: u8) -> Self {
        self.percentage = Some(percentage);
        self
    }
}
