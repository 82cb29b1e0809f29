//! Swap quoting over one or more pools.

use crate::batch::{BatchOrchestrator, BatchPolicy};
use crate::math::SwapMath;
use crate::pool_store::PoolStore;
use cpamm_quote_domain::math::price_impact;
use cpamm_quote_domain::{Pool, QuoteError, QuoteResult, SwapQuote, TokenAmount, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// One entry of a swap batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub path: Vec<TokenId>,
    pub amount_in: TokenAmount,
}

/// Result of quoting a single hop.
#[derive(Debug, Clone, Copy)]
struct Hop {
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    price_impact: f64,
}

/// Quotes swaps, delegating amount math to a [`SwapMath`].
#[derive(Clone)]
pub struct SwapQuoter {
    store: Arc<PoolStore>,
    math: Arc<dyn SwapMath>,
    batch: BatchOrchestrator,
}

impl SwapQuoter {
    pub fn new(store: Arc<PoolStore>, math: Arc<dyn SwapMath>, batch: BatchOrchestrator) -> Self {
        Self { store, math, batch }
    }

    /// Quotes selling exactly `amount_in` of `token_in` for `token_out`.
    pub async fn get_swap_quote(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_in: TokenAmount,
    ) -> QuoteResult<SwapQuote> {
        let pool = self.store.get_pool(token_in, token_out).await?;
        let hop = self.hop_exact_in(&pool, token_in, amount_in).await?;

        info!(
            pool_id = %pool.id,
            amount_in = %hop.amount_in,
            amount_out = %hop.amount_out,
            spot_price = ?pool.spot_price(token_in),
            source = self.math.source(),
            "Swap quote"
        );
        Ok(SwapQuote {
            route: vec![token_in.clone(), token_out.clone()],
            amount_in: hop.amount_in,
            amount_out: hop.amount_out,
            price_impact: hop.price_impact,
        })
    }

    /// Quotes the input needed to receive exactly `amount_out` of `token_out`.
    pub async fn get_swap_quote_for_exact_output(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_out: TokenAmount,
    ) -> QuoteResult<SwapQuote> {
        let pool = self.store.get_pool(token_in, token_out).await?;
        let hop = self.hop_exact_out(&pool, token_in, amount_out).await?;

        info!(
            pool_id = %pool.id,
            amount_in = %hop.amount_in,
            amount_out = %hop.amount_out,
            spot_price = ?pool.spot_price(token_in),
            source = self.math.source(),
            "Exact-output swap quote"
        );
        Ok(SwapQuote {
            route: vec![token_in.clone(), token_out.clone()],
            amount_in: hop.amount_in,
            amount_out: hop.amount_out,
            price_impact: hop.price_impact,
        })
    }

    /// Quotes selling `amount_in` of `path[0]` through every pool along `path`.
    ///
    /// Each hop's output is the next hop's input; the reported price impact
    /// is the sum over hops.
    pub async fn get_multi_hop_quote(
        &self,
        path: &[TokenId],
        amount_in: TokenAmount,
    ) -> QuoteResult<SwapQuote> {
        let pools = self.route_pools(path).await?;

        let mut amount = amount_in;
        let mut total_impact = 0.0;
        for (index, (pool, token_in)) in pools.iter().zip(path).enumerate() {
            if index > 0 && amount.is_zero() {
                return Err(QuoteError::InsufficientLiquidity(format!(
                    "hop {index} of {} receives nothing",
                    route_label(path)
                )));
            }
            let hop = self.hop_exact_in(pool, token_in, amount).await?;
            total_impact += hop.price_impact;
            amount = hop.amount_out;
        }

        let quote = SwapQuote {
            route: path.to_vec(),
            amount_in,
            amount_out: amount,
            price_impact: total_impact,
        };
        info!(
            route = %route_label(path),
            hops = quote.hops(),
            amount_in = %amount_in,
            amount_out = %amount,
            price_impact = total_impact,
            "Multi-hop quote"
        );
        Ok(quote)
    }

    /// Quotes the `path[0]` input needed to receive exactly `amount_out` of
    /// the last token, walking the hops backwards.
    pub async fn get_multi_hop_quote_for_exact_output(
        &self,
        path: &[TokenId],
        amount_out: TokenAmount,
    ) -> QuoteResult<SwapQuote> {
        let pools = self.route_pools(path).await?;

        let mut required = amount_out;
        let mut total_impact = 0.0;
        for (pool, token_in) in pools.iter().zip(path).rev() {
            let hop = self.hop_exact_out(pool, token_in, required).await?;
            total_impact += hop.price_impact;
            required = hop.amount_in;
        }

        let quote = SwapQuote {
            route: path.to_vec(),
            amount_in: required,
            amount_out,
            price_impact: total_impact,
        };
        info!(
            route = %route_label(path),
            hops = quote.hops(),
            amount_in = %required,
            amount_out = %amount_out,
            price_impact = total_impact,
            "Exact-output multi-hop quote"
        );
        Ok(quote)
    }

    /// Quotes every route concurrently. The first failure fails the batch.
    pub async fn batch_get_quotes(&self, queries: &[RouteQuery]) -> QuoteResult<Vec<SwapQuote>> {
        let quoter = self.clone();
        self.batch
            .run(BatchPolicy::Strict, queries.to_vec(), move |query| {
                let quoter = quoter.clone();
                async move {
                    quoter
                        .get_multi_hop_quote(&query.path, query.amount_in)
                        .await
                }
            })
            .await
    }

    /// One pool per hop, each fetched once even when the path revisits it.
    async fn route_pools(&self, path: &[TokenId]) -> QuoteResult<Vec<Pool>> {
        if path.len() < 2 {
            return Err(QuoteError::InvalidPath(format!(
                "a route needs at least two tokens, got {}",
                path.len()
            )));
        }

        let mut pairs: Vec<(TokenId, TokenId)> = Vec::new();
        for hop in path.windows(2) {
            let pair = ordered(&hop[0], &hop[1]);
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }

        let store = self.store.clone();
        let fetched = self
            .batch
            .run_strict(pairs.clone(), move |(a, b)| {
                let store = store.clone();
                async move { store.get_pool(&a, &b).await }
            })
            .await?;
        let by_pair: HashMap<(TokenId, TokenId), Pool> = pairs.into_iter().zip(fetched).collect();

        path.windows(2)
            .map(|hop| {
                by_pair
                    .get(&ordered(&hop[0], &hop[1]))
                    .cloned()
                    .ok_or_else(|| QuoteError::PoolNotFound(format!("{}/{}", hop[0], hop[1])))
            })
            .collect()
    }

    async fn hop_exact_in(
        &self,
        pool: &Pool,
        token_in: &TokenId,
        amount_in: TokenAmount,
    ) -> QuoteResult<Hop> {
        let (reserve_in, reserve_out) = pool.reserves_for(token_in)?;
        if amount_in.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "amount in must be positive".to_string(),
            ));
        }
        ensure_reserves(pool, reserve_in, reserve_out)?;

        let amount_out = self
            .math
            .amount_out(amount_in, reserve_in, reserve_out, pool.swap_fee)
            .await?;
        Ok(Hop {
            amount_in,
            amount_out,
            price_impact: price_impact(amount_in, amount_out, reserve_in, reserve_out),
        })
    }

    async fn hop_exact_out(
        &self,
        pool: &Pool,
        token_in: &TokenId,
        amount_out: TokenAmount,
    ) -> QuoteResult<Hop> {
        let (reserve_in, reserve_out) = pool.reserves_for(token_in)?;
        if amount_out.is_zero() {
            return Err(QuoteError::InvalidAmounts(
                "amount out must be positive".to_string(),
            ));
        }
        ensure_reserves(pool, reserve_in, reserve_out)?;
        if amount_out >= reserve_out {
            return Err(QuoteError::InsufficientLiquidity(format!(
                "pool {} holds {reserve_out}, cannot deliver {amount_out}",
                pool.id
            )));
        }

        let amount_in = self
            .math
            .amount_in(amount_out, reserve_in, reserve_out, pool.swap_fee)
            .await?;
        Ok(Hop {
            amount_in,
            amount_out,
            price_impact: price_impact(amount_in, amount_out, reserve_in, reserve_out),
        })
    }
}

fn ensure_reserves(
    pool: &Pool,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
) -> QuoteResult<()> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(QuoteError::InsufficientLiquidity(format!(
            "pool {} has empty reserves",
            pool.id
        )));
    }
    Ok(())
}

fn ordered(a: &TokenId, b: &TokenId) -> (TokenId, TokenId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

fn route_label(path: &[TokenId]) -> String {
    path.iter()
        .map(TokenId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
