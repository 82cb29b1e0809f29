//! Where swap and deposit amounts come from.

use crate::calls::{call, fee_arg, malformed, uint_arg, uint_field};
use async_trait::async_trait;
use cpamm_quote_chain::prelude::{ChainQuery, ClarityValue, ContractId};
use cpamm_quote_domain::math;
use cpamm_quote_domain::{FeeRatio, Pool, QuoteError, QuoteResult, TokenAmount};
use std::sync::Arc;

/// Amount math for a single pool.
///
/// Callers validate inputs (non-zero amounts, non-empty reserves, output
/// below the reserve) before calling in.
#[async_trait]
pub trait SwapMath: Send + Sync {
    /// Output received for selling `amount_in`.
    async fn amount_out(
        &self,
        amount_in: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount>;

    /// Input required to receive exactly `amount_out`.
    async fn amount_in(
        &self,
        amount_out: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount>;

    /// Amounts actually deposited for the desired ones, keeping the pool ratio.
    async fn optimal_deposit(
        &self,
        pool: &Pool,
        desired0: TokenAmount,
        desired1: TokenAmount,
    ) -> QuoteResult<(TokenAmount, TokenAmount)>;

    /// Short label for logs.
    fn source(&self) -> &'static str;
}

/// Delegates to the library and router contracts.
pub struct ChainSwapMath {
    chain: Arc<dyn ChainQuery>,
    library: ContractId,
    router: ContractId,
}

impl ChainSwapMath {
    pub fn new(chain: Arc<dyn ChainQuery>, library: ContractId, router: ContractId) -> Self {
        Self {
            chain,
            library,
            router,
        }
    }

    async fn library_amount(
        &self,
        method: &'static str,
        amount: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount> {
        let args = [
            uint_arg(amount)?,
            uint_arg(reserve_in)?,
            uint_arg(reserve_out)?,
            fee_arg(fee),
        ];
        let value = call(self.chain.as_ref(), &self.library, method, &args).await?;
        let decode = malformed(&self.library, method);

        match value.into_response().map_err(&decode)? {
            Ok(amount) => amount.expect_uint().map(TokenAmount::from).map_err(&decode),
            Err(code) => Err(QuoteError::InsufficientLiquidity(format!(
                "{method} rejected {amount} against reserves {reserve_in}/{reserve_out}: {code}"
            ))),
        }
    }
}

#[async_trait]
impl SwapMath for ChainSwapMath {
    async fn amount_out(
        &self,
        amount_in: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount> {
        self.library_amount("get-amount-out", amount_in, reserve_in, reserve_out, fee)
            .await
    }

    async fn amount_in(
        &self,
        amount_out: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount> {
        self.library_amount("get-amount-in", amount_out, reserve_in, reserve_out, fee)
            .await
    }

    async fn optimal_deposit(
        &self,
        pool: &Pool,
        desired0: TokenAmount,
        desired1: TokenAmount,
    ) -> QuoteResult<(TokenAmount, TokenAmount)> {
        const METHOD: &str = "add-liquidity-calc";

        let id = pool.id.as_u128().ok_or_else(|| {
            QuoteError::PoolNotFound(format!("{} is not a numeric pool id", pool.id))
        })?;
        // zero minimums: the router reports the raw optimum and the
        // caller checks its own bounds
        let args = [
            ClarityValue::UInt(id),
            uint_arg(desired0)?,
            uint_arg(desired1)?,
            ClarityValue::UInt(0),
            ClarityValue::UInt(0),
        ];
        let value = call(self.chain.as_ref(), &self.router, METHOD, &args).await?;
        let decode = malformed(&self.router, METHOD);

        match value.into_response().map_err(&decode)? {
            Ok(amounts) => Ok((
                uint_field(&amounts, "amt0").map_err(&decode)?,
                uint_field(&amounts, "amt1").map_err(&decode)?,
            )),
            Err(code) => Err(QuoteError::InvalidAmounts(format!(
                "router rejected deposit of {desired0}/{desired1} into pool {}: {code}",
                pool.id
            ))),
        }
    }

    fn source(&self) -> &'static str {
        "chain"
    }
}

/// Evaluates the constant-product formulas locally.
///
/// Interprets `FeeRatio` as the share of the input taken as fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSwapMath;

#[async_trait]
impl SwapMath for LocalSwapMath {
    async fn amount_out(
        &self,
        amount_in: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount> {
        math::amount_out(amount_in, reserve_in, reserve_out, fee)
    }

    async fn amount_in(
        &self,
        amount_out: TokenAmount,
        reserve_in: TokenAmount,
        reserve_out: TokenAmount,
        fee: FeeRatio,
    ) -> QuoteResult<TokenAmount> {
        math::amount_in(amount_out, reserve_in, reserve_out, fee)
    }

    async fn optimal_deposit(
        &self,
        pool: &Pool,
        desired0: TokenAmount,
        desired1: TokenAmount,
    ) -> QuoteResult<(TokenAmount, TokenAmount)> {
        math::optimal_deposit(desired0, desired1, pool.reserve0, pool.reserve1)
    }

    fn source(&self) -> &'static str {
        "local"
    }
}
