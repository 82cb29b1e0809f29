//! Quote engine wiring.

use crate::batch::BatchOrchestrator;
use crate::config::{EngineConfig, MathSource};
use crate::liquidity::LiquidityQuoter;
use crate::math::{ChainSwapMath, LocalSwapMath, SwapMath};
use crate::pool_store::PoolStore;
use crate::removal::RemovalQuoter;
use crate::swap::SwapQuoter;
use cpamm_quote_chain::prelude::{CachedChainQuery, ChainQuery, HiroClient};
use cpamm_quote_domain::QuoteResult;
use std::sync::Arc;
use tracing::info;

/// Pool store and quoters sharing one chain connection.
pub struct QuoteEngine {
    config: EngineConfig,
    pools: Arc<PoolStore>,
    swaps: SwapQuoter,
    liquidity: LiquidityQuoter,
    removals: RemovalQuoter,
}

impl QuoteEngine {
    /// Builds an engine over an existing chain connection.
    pub fn new(config: EngineConfig, chain: Arc<dyn ChainQuery>) -> Self {
        let batch = BatchOrchestrator::new(config.batch_concurrency);
        let pools = Arc::new(PoolStore::new(
            chain.clone(),
            config.contracts.core.clone(),
            batch,
        ));
        let math: Arc<dyn SwapMath> = match config.math_source {
            MathSource::Chain => Arc::new(ChainSwapMath::new(
                chain,
                config.contracts.library.clone(),
                config.contracts.router.clone(),
            )),
            MathSource::Local => Arc::new(LocalSwapMath),
        };

        Self {
            swaps: SwapQuoter::new(pools.clone(), math.clone(), batch),
            liquidity: LiquidityQuoter::new(pools.clone(), math, batch),
            removals: RemovalQuoter::new(pools.clone(), batch),
            pools,
            config,
        }
    }

    /// Connects to the configured node, behind a response cache unless the
    /// TTL is zero.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: EngineConfig) -> QuoteResult<Self> {
        let client = HiroClient::new(config.hiro_config())?;
        let chain: Arc<dyn ChainQuery> = if config.cache_ttl_secs == 0 {
            Arc::new(client)
        } else {
            Arc::new(CachedChainQuery::new(client, config.cache_config()))
        };

        info!(
            node = %config.api_url,
            core = %config.contracts.core,
            math = ?config.math_source,
            cache_ttl_secs = config.cache_ttl_secs,
            "Quote engine configured"
        );
        Ok(Self::new(config, chain))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pools(&self) -> &PoolStore {
        &self.pools
    }

    pub fn swaps(&self) -> &SwapQuoter {
        &self.swaps
    }

    pub fn liquidity(&self) -> &LiquidityQuoter {
        &self.liquidity
    }

    pub fn removals(&self) -> &RemovalQuoter {
        &self.removals
    }
}
