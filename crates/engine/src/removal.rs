//! Withdrawal quoting.

use crate::batch::{BatchOrchestrator, BatchPolicy};
use crate::pool_store::PoolStore;
use cpamm_quote_domain::math::proportional_withdrawal;
use cpamm_quote_domain::{
    Percentage, Pool, PoolId, QuoteError, QuoteResult, RemovalQuote, TokenAmount,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Fractions of a position quoted by [`RemovalQuoter::get_remove_liquidity_range_quotes`].
pub const RANGE_PERCENTAGES: [u8; 4] = [25, 50, 75, 100];

/// One entry of a withdrawal batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalQuoteRequest {
    pub pool_id: PoolId,
    pub liquidity_tokens: TokenAmount,
}

/// Quotes burning LP tokens.
#[derive(Clone)]
pub struct RemovalQuoter {
    store: Arc<PoolStore>,
    batch: BatchOrchestrator,
}

impl RemovalQuoter {
    pub fn new(store: Arc<PoolStore>, batch: BatchOrchestrator) -> Self {
        Self { store, batch }
    }

    /// Quotes the reserves returned for burning `liquidity_tokens`.
    pub async fn get_remove_liquidity_quote(
        &self,
        pool_id: &PoolId,
        liquidity_tokens: TokenAmount,
    ) -> QuoteResult<RemovalQuote> {
        if liquidity_tokens.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "liquidity tokens must be positive".to_string(),
            ));
        }
        let pool = self.store.get_pool_by_id(pool_id).await?;
        let quote = quote_removal(&pool, liquidity_tokens)?;

        info!(
            pool_id = %pool_id,
            liquidity = %liquidity_tokens,
            amount0 = %quote.token0_amount,
            amount1 = %quote.token1_amount,
            "Removal quote"
        );
        Ok(quote)
    }

    /// Quotes removing 25, 50, 75 and 100 percent of `total_liquidity`
    /// against a single pool snapshot.
    pub async fn get_remove_liquidity_range_quotes(
        &self,
        pool_id: &PoolId,
        total_liquidity: TokenAmount,
    ) -> QuoteResult<Vec<RemovalQuote>> {
        if total_liquidity.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "liquidity tokens must be positive".to_string(),
            ));
        }
        let pool = self.store.get_pool_by_id(pool_id).await?;

        let quotes = RANGE_PERCENTAGES
            .iter()
            .map(|&percentage| {
                let share = total_liquidity
                    .checked_mul(TokenAmount::from(u64::from(percentage)))
                    .and_then(|scaled| scaled.checked_div(TokenAmount::from(100u64)))
                    .ok_or_else(|| {
                        QuoteError::InvalidAmounts(format!("{total_liquidity} is out of range"))
                    })?;
                if share.is_zero() {
                    return Err(QuoteError::InvalidAmounts(format!(
                        "{percentage}% of {total_liquidity} LP tokens rounds to zero"
                    )));
                }
                quote_removal(&pool, share).map(|quote| quote.with_percentage(percentage))
            })
            .collect::<QuoteResult<Vec<_>>>()?;

        info!(pool_id = %pool_id, total = %total_liquidity, "Removal range quotes");
        Ok(quotes)
    }

    /// Quotes every request concurrently, dropping requests that fail for
    /// pool or amount reasons.
    pub async fn batch_get_remove_liquidity_quotes(
        &self,
        requests: &[RemovalQuoteRequest],
    ) -> QuoteResult<Vec<RemovalQuote>> {
        let quoter = self.clone();
        self.batch
            .run(BatchPolicy::Lenient, requests.to_vec(), move |r| {
                let quoter = quoter.clone();
                async move {
                    quoter
                        .get_remove_liquidity_quote(&r.pool_id, r.liquidity_tokens)
                        .await
                }
            })
            .await
    }
}

fn quote_removal(pool: &Pool, liquidity_tokens: TokenAmount) -> QuoteResult<RemovalQuote> {
    let supply = pool.lp_token_total_supply;
    if pool.is_empty() {
        return Err(QuoteError::ZeroLiquidity(format!(
            "pool {} has no LP supply",
            pool.id
        )));
    }
    if liquidity_tokens > supply {
        return Err(QuoteError::InsufficientLiquidity(format!(
            "{liquidity_tokens} LP tokens exceed supply {supply} of pool {}",
            pool.id
        )));
    }

    let (token0_amount, token1_amount) = proportional_withdrawal(pool, liquidity_tokens)?;
    if token0_amount.is_zero() || token1_amount.is_zero() {
        return Err(QuoteError::InvalidAmounts(format!(
            "burning {liquidity_tokens} LP tokens of pool {} returns nothing on one side",
            pool.id
        )));
    }

    Ok(RemovalQuote {
        token0_amount,
        token1_amount,
        share_of_pool: Percentage::from_ratio(liquidity_tokens, supply)?,
        percentage: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockChain, token};
    use cpamm_quote_domain::ErrorKind;
    use proptest::prelude::*;

    fn quoter(mock: &Arc<MockChain>) -> RemovalQuoter {
        let batch = BatchOrchestrator::new(4);
        RemovalQuoter::new(
            Arc::new(PoolStore::new(mock.clone(), mock.contracts().core, batch)),
            batch,
        )
    }

    fn amount(n: u64) -> TokenAmount {
        TokenAmount::from(n)
    }

    fn seeded() -> (Arc<MockChain>, PoolId) {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 1_000_000, 2_000_000, 1_000_000);
        (mock, PoolId::from(id))
    }

    #[tokio::test]
    async fn test_full_removal_returns_reserves() {
        let (mock, id) = seeded();
        let quote = quoter(&mock)
            .get_remove_liquidity_quote(&id, amount(1_000_000))
            .await
            .unwrap();
        assert_eq!(quote.token0_amount, amount(1_000_000));
        assert_eq!(quote.token1_amount, amount(2_000_000));
        assert_eq!(quote.share_of_pool, Percentage::HUNDRED);
    }

    #[tokio::test]
    async fn test_partial_removal_floors() {
        let mock = Arc::new(MockChain::new());
        let id = PoolId::from(mock.add_pool(token("a"), token("b"), 1_000, 2_001, 3));
        let quote = quoter(&mock)
            .get_remove_liquidity_quote(&id, amount(1))
            .await
            .unwrap();
        assert_eq!(quote.token0_amount, amount(333));
        assert_eq!(quote.token1_amount, amount(667));
        assert_eq!(quote.share_of_pool.to_string(), "33.333333%");
    }

    #[tokio::test]
    async fn test_precondition_errors() {
        let (mock, id) = seeded();
        let quoter = quoter(&mock);

        let err = quoter
            .get_remove_liquidity_quote(&id, amount(0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmounts);

        let err = quoter
            .get_remove_liquidity_quote(&id, amount(1_000_001))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientLiquidity);

        let empty = PoolId::from(mock.add_pool(token("c"), token("d"), 0, 0, 0));
        let err = quoter
            .get_remove_liquidity_quote(&empty, amount(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ZeroLiquidity);
    }

    #[tokio::test]
    async fn test_dust_removal_is_invalid() {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 10, 10_000_000, 1_000_000);
        let id = PoolId::from(id);
        let err = quoter(&mock)
            .get_remove_liquidity_quote(&id, amount(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmounts);
    }

    #[tokio::test]
    async fn test_range_quotes() {
        let (mock, id) = seeded();
        let quotes = quoter(&mock)
            .get_remove_liquidity_range_quotes(&id, amount(400_000))
            .await
            .unwrap();

        let percentages: Vec<_> = quotes.iter().map(|q| q.percentage).collect();
        assert_eq!(percentages, vec![Some(25), Some(50), Some(75), Some(100)]);
        assert_eq!(quotes[0].token0_amount, amount(100_000));
        assert_eq!(quotes[3].token1_amount, amount(800_000));
        for pair in quotes.windows(2) {
            assert!(pair[0].token0_amount < pair[1].token0_amount);
        }
        assert_eq!(mock.calls("get-pool"), 1);
    }

    #[tokio::test]
    async fn test_range_fails_on_first_bad_percentage() {
        let (mock, id) = seeded();
        // 25% of 3 rounds to zero
        let err = quoter(&mock)
            .get_remove_liquidity_range_quotes(&id, amount(3))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmounts);
    }

    #[tokio::test]
    async fn test_batch_is_lenient() {
        let (mock, id) = seeded();
        let requests = [
            RemovalQuoteRequest {
                pool_id: id.clone(),
                liquidity_tokens: amount(10),
            },
            RemovalQuoteRequest {
                pool_id: PoolId::from(404u128),
                liquidity_tokens: amount(10),
            },
            RemovalQuoteRequest {
                pool_id: id.clone(),
                liquidity_tokens: amount(5_000_000),
            },
            RemovalQuoteRequest {
                pool_id: id,
                liquidity_tokens: amount(20),
            },
        ];
        let quotes = quoter(&mock)
            .batch_get_remove_liquidity_quotes(&requests)
            .await
            .unwrap();
        let amounts: Vec<_> = quotes.iter().map(|q| q.token0_amount).collect();
        assert_eq!(amounts, vec![amount(10), amount(20)]);
    }

    #[tokio::test]
    async fn test_batch_aborts_on_network_error() {
        let (mock, id) = seeded();
        let down = mock.add_pool(token("c"), token("d"), 1_000, 2_000, 1_414);
        mock.fail_pool(down);

        let requests = [
            RemovalQuoteRequest {
                pool_id: id,
                liquidity_tokens: amount(10),
            },
            RemovalQuoteRequest {
                pool_id: PoolId::from(down),
                liquidity_tokens: amount(10),
            },
        ];
        let err = quoter(&mock)
            .batch_get_remove_liquidity_quotes(&requests)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
    }

    proptest! {
        #[test]
        fn prop_removal_never_exceeds_reserves(
            reserve0 in 1u64..u64::MAX / 2,
            reserve1 in 1u64..u64::MAX / 2,
            supply in 1u64..u64::MAX / 2,
            burn in 1u64..u64::MAX / 2,
        ) {
            let mock = MockChain::new();
            let id = mock.add_pool(
                token("a"),
                token("b"),
                reserve0.into(),
                reserve1.into(),
                supply.into(),
            );
            let pool = mock.pool_snapshot(id);
            match quote_removal(&pool, amount(burn)) {
                Ok(quote) => {
                    prop_assert!(burn <= supply);
                    prop_assert!(quote.token0_amount <= pool.reserve0);
                    prop_assert!(quote.token1_amount <= pool.reserve1);
                }
                Err(e) => prop_assert!(matches!(
                    e.kind(),
                    ErrorKind::InsufficientLiquidity | ErrorKind::InvalidAmounts
                )),
            }
        }
    }
}
