//! Pool lookup against the core contract.

use crate::batch::BatchOrchestrator;
use crate::calls::{call, malformed, principal_arg, uint_field, unwrap_ok};
use cpamm_quote_chain::prelude::{ChainQuery, ClarityValue, CodecError, ContractId, ReadCall};
use cpamm_quote_domain::{FeeRatio, Pool, PoolId, QuoteError, QuoteResult, TokenAmount, TokenId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Unordered token pair, stored lexicographically.
type PairKey = (TokenId, TokenId);

fn pair_key(a: &TokenId, b: &TokenId) -> PairKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Fetches pool snapshots from the core contract.
///
/// Pool state is always read fresh (modulo the response cache of the
/// underlying [`ChainQuery`]). Only the id a token pair resolves to is
/// remembered, because pool ids never change once registered.
///
/// Clones share the chain connection and the pair cache.
#[derive(Clone)]
pub struct PoolStore {
    chain: Arc<dyn ChainQuery>,
    core: ContractId,
    batch: BatchOrchestrator,
    pair_ids: Arc<RwLock<HashMap<PairKey, PoolId>>>,
}

impl PoolStore {
    /// Creates a store reading from `core`.
    pub fn new(chain: Arc<dyn ChainQuery>, core: ContractId, batch: BatchOrchestrator) -> Self {
        Self {
            chain,
            core,
            batch,
            pair_ids: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn core(&self) -> &ContractId {
        &self.core
    }

    /// Fetches a pool by id, including its LP token supply.
    ///
    /// The pool record and the supply are read as one chained call, so a
    /// caching [`ChainQuery`] never pairs reserves and supply from different
    /// moments.
    ///
    /// # Errors
    /// `PoolNotFound` for an unknown or non-numeric id.
    pub async fn get_pool_by_id(&self, id: &PoolId) -> QuoteResult<Pool> {
        const METHOD: &str = "get-pool";

        let numeric = id
            .as_u128()
            .ok_or_else(|| QuoteError::PoolNotFound(format!("{id} is not a pool id")))?;

        let first = ReadCall::new(self.core.clone(), METHOD, vec![ClarityValue::UInt(numeric)]);
        debug!(contract = %self.core, method = METHOD, "Chained read-only call");
        let (value, supply) = self
            .chain
            .call_read_only_chained(&first, supply_call)
            .await?;
        let decode = malformed(&self.core, METHOD);

        let record = unwrap_ok(value)
            .and_then(ClarityValue::into_optional)
            .map_err(&decode)?
            .ok_or_else(|| QuoteError::PoolNotFound(id.to_string()))?;

        let token0 = principal_field(&record, "token0").map_err(&decode)?;
        let token1 = principal_field(&record, "token1").map_err(&decode)?;
        let lp_token = principal_field(&record, "lp-token").map_err(&decode)?;
        let reserve0 = uint_field(&record, "reserve0").map_err(&decode)?;
        let reserve1 = uint_field(&record, "reserve1").map_err(&decode)?;
        let swap_fee = self.fee_field(&record, "swap-fee")?;
        let protocol_fee = self.optional_fee_field(&record, "protocol-fee")?;
        let share_fee = self.optional_fee_field(&record, "share-fee")?;

        let lp_token_total_supply = total_supply(&lp_token, supply)?;

        let pool = Pool {
            id: PoolId::from(numeric),
            token0,
            token1,
            lp_token,
            reserve0,
            reserve1,
            lp_token_total_supply,
            swap_fee,
            protocol_fee,
            share_fee,
        };
        debug!(
            pool_id = %pool.id,
            reserve0 = %pool.reserve0,
            reserve1 = %pool.reserve1,
            supply = %pool.lp_token_total_supply,
            "Fetched pool"
        );
        Ok(pool)
    }

    /// Resolves the pool for a token pair, in either order.
    pub async fn get_pool(&self, token0: &TokenId, token1: &TokenId) -> QuoteResult<Pool> {
        let id = self.get_pool_id(token0, token1).await?;
        self.get_pool_by_id(&id).await
    }

    /// Fetches several pools concurrently, in input order.
    ///
    /// Unknown ids are skipped; any other failure fails the call.
    pub async fn get_pools(&self, ids: &[PoolId]) -> QuoteResult<Vec<Pool>> {
        let store = self.clone();
        let pools = self
            .batch
            .run_lenient(
                ids.to_vec(),
                move |id| {
                    let store = store.clone();
                    async move { store.get_pool_by_id(&id).await }
                },
                |e| matches!(e, QuoteError::PoolNotFound(_)),
            )
            .await?;
        info!(requested = ids.len(), found = pools.len(), "Fetched pools");
        Ok(pools)
    }

    async fn get_pool_id(&self, token0: &TokenId, token1: &TokenId) -> QuoteResult<PoolId> {
        if token0 == token1 {
            return Err(QuoteError::InvalidPath(format!(
                "cannot pair {token0} with itself"
            )));
        }

        let key = pair_key(token0, token1);
        if let Some(id) = self.pair_ids.read().await.get(&key) {
            debug!(pool_id = %id, "Pair resolved from cache");
            return Ok(id.clone());
        }

        let id = match self.lookup_pool_id(token0, token1).await? {
            Some(id) => id,
            None => self
                .lookup_pool_id(token1, token0)
                .await?
                .ok_or_else(|| QuoteError::PoolNotFound(format!("{token0}/{token1}")))?,
        };

        self.pair_ids.write().await.insert(key, id.clone());
        Ok(id)
    }

    async fn lookup_pool_id(&self, a: &TokenId, b: &TokenId) -> QuoteResult<Option<PoolId>> {
        const METHOD: &str = "get-pool-id";

        let args = [principal_arg(a)?, principal_arg(b)?];
        let value = call(self.chain.as_ref(), &self.core, METHOD, &args).await?;
        let decode = malformed(&self.core, METHOD);

        unwrap_ok(value)
            .and_then(ClarityValue::into_optional)
            .and_then(|id| id.map(|v| v.expect_uint()).transpose())
            .map(|id| id.map(PoolId::from))
            .map_err(decode)
    }

    fn fee_field(&self, record: &ClarityValue, name: &str) -> QuoteResult<FeeRatio> {
        let decode = malformed(&self.core, "get-pool");
        let fee = record.field(name).map_err(&decode)?;
        self.fee_from(fee, name)
    }

    fn optional_fee_field(
        &self,
        record: &ClarityValue,
        name: &str,
    ) -> QuoteResult<Option<FeeRatio>> {
        match record.field(name) {
            Ok(fee) => self.fee_from(fee, name).map(Some),
            Err(CodecError::MissingField(_)) => Ok(None),
            Err(e) => Err(malformed(&self.core, "get-pool")(e)),
        }
    }

    fn fee_from(&self, fee: &ClarityValue, name: &str) -> QuoteResult<FeeRatio> {
        let decode = malformed(&self.core, "get-pool");
        let num = fee
            .field("num")
            .and_then(ClarityValue::expect_uint)
            .map_err(&decode)?;
        let den = fee
            .field("den")
            .and_then(ClarityValue::expect_uint)
            .map_err(&decode)?;
        FeeRatio::new(num, den).map_err(|e| {
            QuoteError::contract(
                self.core.to_string(),
                "get-pool",
                format!("malformed {name}: {e}"),
            )
        })
    }
}

const SUPPLY_METHOD: &str = "get-total-supply";

/// Follow-up of `get-pool`: the LP token's `get-total-supply`.
fn supply_call(pool: &ClarityValue) -> Option<ReadCall> {
    let record = unwrap_ok(pool.clone()).ok()?.into_optional().ok()??;
    let lp_token = principal_field(&record, "lp-token").ok()?;
    let contract = lp_token.as_str().parse().ok()?;
    Some(ReadCall::new(contract, SUPPLY_METHOD, Vec::new()))
}

fn total_supply(lp_token: &TokenId, value: Option<ClarityValue>) -> QuoteResult<TokenAmount> {
    let contract: ContractId = lp_token
        .as_str()
        .parse()
        .map_err(|e| QuoteError::contract(lp_token.as_str(), SUPPLY_METHOD, format!("{e}")))?;
    let value = value.ok_or_else(|| {
        QuoteError::contract(contract.to_string(), SUPPLY_METHOD, "supply was not read")
    })?;

    unwrap_ok(value)
        .and_then(|v| v.expect_uint())
        .map(TokenAmount::from)
        .map_err(malformed(&contract, SUPPLY_METHOD))
}

fn principal_field(record: &ClarityValue, name: &str) -> Result<TokenId, CodecError> {
    record
        .field(name)?
        .expect_principal()
        .map(|p| TokenId::new(p.to_string()))
}
