//! In-memory chain answering the DEX contract methods with the reference math.

use crate::config::DexContracts;
use async_trait::async_trait;
use cpamm_quote_chain::prelude::{ChainError, ChainQuery, ClarityValue, ContractId};
use cpamm_quote_domain::math;
use cpamm_quote_domain::{FeeRatio, Pool, PoolId, TokenAmount, TokenId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) const DEPLOYER: &str = "SP000000000000000000002Q6VF78";

pub(crate) fn token(name: &str) -> TokenId {
    TokenId::new(format!("{DEPLOYER}.{name}"))
}

#[derive(Debug, Clone)]
struct MockPool {
    token0: TokenId,
    token1: TokenId,
    lp_token: TokenId,
    reserve0: u128,
    reserve1: u128,
    supply: u128,
    fee: FeeRatio,
}

#[derive(Default)]
struct State {
    pools: HashMap<u128, MockPool>,
    failing: HashSet<u128>,
    rejecting: HashSet<u128>,
    calls: HashMap<String, usize>,
}

pub(crate) struct MockChain {
    contracts: DexContracts,
    state: Mutex<State>,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self {
            contracts: DexContracts {
                core: ContractId::new(DEPLOYER, "univ2-core"),
                library: ContractId::new(DEPLOYER, "univ2-library"),
                router: ContractId::new(DEPLOYER, "univ2-router"),
            },
            state: Mutex::new(State::default()),
        }
    }

    pub(crate) fn contracts(&self) -> DexContracts {
        self.contracts.clone()
    }

    /// Registers a pool with a 0.3% fee and returns its id.
    pub(crate) fn add_pool(
        &self,
        token0: TokenId,
        token1: TokenId,
        reserve0: u128,
        reserve1: u128,
        supply: u128,
    ) -> u128 {
        let mut state = self.state.lock().unwrap();
        let id = state.pools.len() as u128 + 1;
        state.pools.insert(
            id,
            MockPool {
                token0,
                token1,
                lp_token: token(&format!("lp-token-{id}")),
                reserve0,
                reserve1,
                supply,
                fee: FeeRatio::new(30, 10_000).unwrap(),
            },
        );
        id
    }

    /// Makes every `get-pool` for `id` fail at the transport level.
    pub(crate) fn fail_pool(&self, id: u128) {
        self.state.lock().unwrap().failing.insert(id);
    }

    /// Makes the router reject every deposit into `id` with `(err u2002)`.
    pub(crate) fn reject_deposits(&self, id: u128) {
        self.state.lock().unwrap().rejecting.insert(id);
    }

    pub(crate) fn set_reserves(&self, id: u128, reserve0: u128, reserve1: u128) {
        let mut state = self.state.lock().unwrap();
        let pool = state.pools.get_mut(&id).unwrap();
        pool.reserve0 = reserve0;
        pool.reserve1 = reserve1;
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn pool_snapshot(&self, id: u128) -> Pool {
        let state = self.state.lock().unwrap();
        let pool = &state.pools[&id];
        Pool {
            id: PoolId::from(id),
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            lp_token: pool.lp_token.clone(),
            reserve0: TokenAmount::from(pool.reserve0),
            reserve1: TokenAmount::from(pool.reserve1),
            lp_token_total_supply: TokenAmount::from(pool.supply),
            swap_fee: pool.fee,
            protocol_fee: None,
            share_fee: None,
        }
    }

    fn pool_value(id: u128, pool: &MockPool) -> ClarityValue {
        let fee = |f: FeeRatio| {
            ClarityValue::tuple([
                ("num", ClarityValue::UInt(f.numerator())),
                ("den", ClarityValue::UInt(f.denominator())),
            ])
        };
        let principal = |t: &TokenId| ClarityValue::principal(t.as_str()).unwrap();
        ClarityValue::tuple([
            ("id", ClarityValue::UInt(id)),
            ("token0", principal(&pool.token0)),
            ("token1", principal(&pool.token1)),
            ("lp-token", principal(&pool.lp_token)),
            ("reserve0", ClarityValue::UInt(pool.reserve0)),
            ("reserve1", ClarityValue::UInt(pool.reserve1)),
            ("swap-fee", fee(pool.fee)),
            ("protocol-fee", fee(FeeRatio::new(500, 10_000).unwrap())),
            ("share-fee", fee(FeeRatio::new(0, 10_000).unwrap())),
        ])
    }
}

fn amount(value: &ClarityValue) -> TokenAmount {
    TokenAmount::from(value.expect_uint().unwrap())
}

fn fee_from(value: &ClarityValue) -> FeeRatio {
    FeeRatio::new(
        value.field("num").unwrap().expect_uint().unwrap(),
        value.field("den").unwrap().expect_uint().unwrap(),
    )
    .unwrap()
}

fn math_response(
    result: cpamm_quote_domain::QuoteResult<TokenAmount>,
) -> ClarityValue {
    match result {
        Ok(v) => ClarityValue::ok(ClarityValue::UInt(v.to_u128().unwrap())),
        Err(_) => ClarityValue::err(ClarityValue::UInt(2001)),
    }
}

#[async_trait]
impl ChainQuery for MockChain {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn call_read_only(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ChainError> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(method.to_string()).or_default() += 1;

        let unknown = || ChainError::Contract {
            contract: contract.to_string(),
            method: method.to_string(),
            cause: "Unchecked(NoSuchPublicFunction)".to_string(),
        };

        if contract == &self.contracts.core {
            return match method {
                "get-pool-id" => {
                    let (a, b) = (args[0].to_string(), args[1].to_string());
                    let found = state.pools.iter().find(|(_, p)| {
                        a == format!("'{}", p.token0) && b == format!("'{}", p.token1)
                    });
                    Ok(match found {
                        Some((id, _)) => ClarityValue::some(ClarityValue::UInt(*id)),
                        None => ClarityValue::OptionalNone,
                    })
                }
                "get-pool" => {
                    let id = args[0].expect_uint().unwrap();
                    if state.failing.contains(&id) {
                        return Err(ChainError::Network {
                            message: format!("pool {id} unreachable"),
                            source: None,
                        });
                    }
                    Ok(match state.pools.get(&id) {
                        Some(pool) => ClarityValue::some(Self::pool_value(id, pool)),
                        None => ClarityValue::OptionalNone,
                    })
                }
                _ => Err(unknown()),
            };
        }

        if contract == &self.contracts.library {
            let fee = fee_from(&args[3]);
            let (x, rin, rout) = (amount(&args[0]), amount(&args[1]), amount(&args[2]));
            return match method {
                "get-amount-out" => Ok(math_response(math::amount_out(x, rin, rout, fee))),
                "get-amount-in" => Ok(math_response(math::amount_in(x, rin, rout, fee))),
                _ => Err(unknown()),
            };
        }

        if contract == &self.contracts.router && method == "add-liquidity-calc" {
            let id = args[0].expect_uint().unwrap();
            if state.rejecting.contains(&id) {
                return Ok(ClarityValue::err(ClarityValue::UInt(2002)));
            }
            let pool = &state.pools[&id];
            let (a0, a1) = math::optimal_deposit(
                amount(&args[1]),
                amount(&args[2]),
                TokenAmount::from(pool.reserve0),
                TokenAmount::from(pool.reserve1),
            )
            .unwrap();
            return Ok(ClarityValue::ok(ClarityValue::tuple([
                ("amt0", ClarityValue::UInt(a0.to_u128().unwrap())),
                ("amt1", ClarityValue::UInt(a1.to_u128().unwrap())),
            ])));
        }

        if method == "get-total-supply" {
            let name = contract.to_string();
            if let Some(pool) = state.pools.values().find(|p| p.lp_token.as_str() == name) {
                return Ok(ClarityValue::ok(ClarityValue::UInt(pool.supply)));
            }
        }

        Err(unknown())
    }
}
