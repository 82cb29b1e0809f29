//! Deposit quoting.

use crate::batch::{BatchOrchestrator, BatchPolicy};
use crate::math::SwapMath;
use crate::pool_store::PoolStore;
use cpamm_quote_domain::math::{deposit_price_impact, lp_tokens_to_mint, share_after_deposit};
use cpamm_quote_domain::{LiquidityQuote, Pool, PoolId, QuoteError, QuoteResult, TokenAmount};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// One entry of a deposit batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityQuoteRequest {
    pub pool_id: PoolId,
    pub amount0_desired: TokenAmount,
    pub amount1_desired: TokenAmount,
    #[serde(default)]
    pub amount0_min: TokenAmount,
    #[serde(default)]
    pub amount1_min: TokenAmount,
}

/// Quotes liquidity deposits.
#[derive(Clone)]
pub struct LiquidityQuoter {
    store: Arc<PoolStore>,
    math: Arc<dyn SwapMath>,
    batch: BatchOrchestrator,
}

impl LiquidityQuoter {
    pub fn new(store: Arc<PoolStore>, math: Arc<dyn SwapMath>, batch: BatchOrchestrator) -> Self {
        Self { store, math, batch }
    }

    /// Quotes depositing up to the desired amounts into `pool_id`.
    ///
    /// Amounts, LP tokens, share and price impact all come from one pool
    /// snapshot.
    ///
    /// # Errors
    /// `InvalidAmounts` for a zero desired amount, `MinimumNotMet` when the
    /// optimal deposit falls below either minimum.
    pub async fn get_liquidity_quote(
        &self,
        pool_id: &PoolId,
        amount0_desired: TokenAmount,
        amount1_desired: TokenAmount,
        amount0_min: TokenAmount,
        amount1_min: TokenAmount,
    ) -> QuoteResult<LiquidityQuote> {
        if amount0_desired.is_zero() || amount1_desired.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "desired amounts must be positive".to_string(),
            ));
        }

        let pool = self.store.get_pool_by_id(pool_id).await?;
        let (amount0, amount1) = self
            .math
            .optimal_deposit(&pool, amount0_desired, amount1_desired)
            .await?;

        if amount0 < amount0_min || amount1 < amount1_min {
            return Err(QuoteError::MinimumNotMet(format!(
                "pool {pool_id} takes {amount0}/{amount1}, minimums are {amount0_min}/{amount1_min}"
            )));
        }

        let quote = quote_deposit(&pool, amount0, amount1)?;
        info!(
            pool_id = %pool_id,
            amount0 = %quote.token0_amount,
            amount1 = %quote.token1_amount,
            liquidity = %quote.liquidity_tokens,
            share = %quote.share_of_pool,
            "Liquidity quote"
        );
        Ok(quote)
    }

    /// LP tokens minted for depositing exactly `amount0`/`amount1`.
    pub async fn calculate_liquidity_tokens(
        &self,
        pool_id: &PoolId,
        amount0: TokenAmount,
        amount1: TokenAmount,
    ) -> QuoteResult<TokenAmount> {
        let pool = self.store.get_pool_by_id(pool_id).await?;
        lp_tokens_to_mint(&pool, amount0, amount1)
    }

    /// Quotes every request concurrently, dropping requests that fail for
    /// pool or amount reasons.
    pub async fn batch_get_liquidity_quotes(
        &self,
        requests: &[LiquidityQuoteRequest],
    ) -> QuoteResult<Vec<LiquidityQuote>> {
        let quoter = self.clone();
        self.batch
            .run(BatchPolicy::Lenient, requests.to_vec(), move |r| {
                let quoter = quoter.clone();
                async move {
                    quoter
                        .get_liquidity_quote(
                            &r.pool_id,
                            r.amount0_desired,
                            r.amount1_desired,
                            r.amount0_min,
                            r.amount1_min,
                        )
                        .await
                }
            })
            .await
    }
}

fn quote_deposit(
    pool: &Pool,
    amount0: TokenAmount,
    amount1: TokenAmount,
) -> QuoteResult<LiquidityQuote> {
    let liquidity_tokens = lp_tokens_to_mint(pool, amount0, amount1)?;
    if liquidity_tokens.is_zero() {
        return Err(QuoteError::InvalidAmounts(format!(
            "deposit of {amount0}/{amount1} into pool {} mints no LP tokens",
            pool.id
        )));
    }
    Ok(LiquidityQuote {
        token0_amount: amount0,
        token1_amount: amount1,
        liquidity_tokens,
        share_of_pool: share_after_deposit(liquidity_tokens, pool.lp_token_total_supply)?,
        price_impact: deposit_price_impact(pool, amount0, amount1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ChainSwapMath;
    use crate::testing::{MockChain, token};
    use cpamm_quote_domain::{ErrorKind, Percentage};

    fn quoter(mock: &Arc<MockChain>) -> LiquidityQuoter {
        let contracts = mock.contracts();
        let batch = BatchOrchestrator::new(4);
        LiquidityQuoter::new(
            Arc::new(PoolStore::new(mock.clone(), contracts.core, batch)),
            Arc::new(ChainSwapMath::new(
                mock.clone(),
                contracts.library,
                contracts.router,
            )),
            batch,
        )
    }

    fn amount(n: u64) -> TokenAmount {
        TokenAmount::from(n)
    }

    #[tokio::test]
    async fn test_first_deposit_mints_sqrt() {
        let mock = Arc::new(MockChain::new());
        let id = PoolId::from(mock.add_pool(token("a"), token("b"), 0, 0, 0));
        let quoter = quoter(&mock);

        let quote = quoter
            .get_liquidity_quote(&id, amount(100), amount(400), amount(0), amount(0))
            .await
            .unwrap();
        assert_eq!(quote.liquidity_tokens, amount(200));
        assert_eq!(quote.share_of_pool, Percentage::HUNDRED);
        assert_eq!(quote.price_impact, 0.0);
    }

    #[tokio::test]
    async fn test_deposit_follows_pool_ratio() {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 1_000_000, 2_000_000, 1_000_000);
        let id = PoolId::from(id);
        let quoter = quoter(&mock);

        let quote = quoter
            .get_liquidity_quote(&id, amount(10_000), amount(50_000), amount(0), amount(0))
            .await
            .unwrap();
        assert_eq!(quote.token0_amount, amount(10_000));
        assert_eq!(quote.token1_amount, amount(20_000));
        assert_eq!(quote.liquidity_tokens, amount(10_000));
        assert!(quote.price_impact < 1e-9);
        assert!(quote.share_of_pool.to_f64() > 0.99 && quote.share_of_pool.to_f64() < 1.0);
        assert_eq!(mock.calls("get-pool"), 1);
    }

    #[tokio::test]
    async fn test_minimum_not_met() {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 1_000_000, 2_000_000, 1_000_000);
        let id = PoolId::from(id);
        let quoter = quoter(&mock);

        let err = quoter
            .get_liquidity_quote(&id, amount(10_000), amount(50_000), amount(0), amount(30_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MinimumNotMet);
    }

    #[tokio::test]
    async fn test_zero_desired_amount() {
        let mock = Arc::new(MockChain::new());
        let id = PoolId::from(mock.add_pool(token("a"), token("b"), 10, 20, 14));
        let quoter = quoter(&mock);

        let err = quoter
            .get_liquidity_quote(&id, amount(0), amount(5), amount(0), amount(0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmounts);
        assert_eq!(mock.calls("get-pool"), 0);
    }

    #[tokio::test]
    async fn test_share_grows_with_deposit() {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 1_000_000, 1_000_000, 1_000_000);
        let id = PoolId::from(id);
        let quoter = quoter(&mock);

        let mut last = Percentage::ZERO;
        for size in [1_000u64, 10_000, 100_000, 1_000_000] {
            let quote = quoter
                .get_liquidity_quote(&id, amount(size), amount(size), amount(0), amount(0))
                .await
                .unwrap();
            assert!(quote.share_of_pool > last);
            last = quote.share_of_pool;
        }
    }

    #[tokio::test]
    async fn test_calculate_liquidity_tokens() {
        let mock = Arc::new(MockChain::new());
        let id = PoolId::from(mock.add_pool(token("a"), token("b"), 1_000, 4_000, 2_000));
        let quoter = quoter(&mock);

        // the token1 side is the binding one
        let lp = quoter
            .calculate_liquidity_tokens(&id, amount(100), amount(200))
            .await
            .unwrap();
        assert_eq!(lp, amount(100));
    }

    #[tokio::test]
    async fn test_batch_is_lenient() {
        let mock = Arc::new(MockChain::new());
        let id = PoolId::from(mock.add_pool(token("a"), token("b"), 1_000, 2_000, 1_414));
        let quoter = quoter(&mock);

        let good = LiquidityQuoteRequest {
            pool_id: id.clone(),
            amount0_desired: amount(10),
            amount1_desired: amount(20),
            amount0_min: amount(0),
            amount1_min: amount(0),
        };
        let missing = LiquidityQuoteRequest {
            pool_id: PoolId::from(77u128),
            ..good.clone()
        };
        let too_strict = LiquidityQuoteRequest {
            amount1_min: amount(1_000),
            ..good.clone()
        };

        let quotes = quoter
            .batch_get_liquidity_quotes(&[good.clone(), missing, too_strict, good])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_aborts_on_network_error() {
        let mock = Arc::new(MockChain::new());
        let id = mock.add_pool(token("a"), token("b"), 1_000, 2_000, 1_414);
        mock.fail_pool(id);
        let quoter = quoter(&mock);

        let request = LiquidityQuoteRequest {
            pool_id: PoolId::from(id),
            amount0_desired: amount(10),
            amount1_desired: amount(20),
            amount0_min: amount(0),
            amount1_min: amount(0),
        };
        let err = quoter
            .batch_get_liquidity_quotes(&[request])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkError);
    }

    #[tokio::test]
    async fn test_batch_drops_router_rejection() {
        let mock = Arc::new(MockChain::new());
        let good = PoolId::from(mock.add_pool(token("a"), token("b"), 1_000, 2_000, 1_414));
        let bad = mock.add_pool(token("c"), token("d"), 1_000, 2_000, 1_414);
        mock.reject_deposits(bad);
        let quoter = quoter(&mock);

        let request = |pool_id: PoolId| LiquidityQuoteRequest {
            pool_id,
            amount0_desired: amount(10),
            amount1_desired: amount(20),
            amount0_min: amount(0),
            amount1_min: amount(0),
        };
        let quotes = quoter
            .batch_get_liquidity_quotes(&[
                request(good.clone()),
                request(PoolId::from(bad)),
                request(good),
            ])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(mock.calls("add-liquidity-calc"), 3);
    }
}
