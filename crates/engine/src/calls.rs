//! Helpers shared by the components that talk to contracts.

use cpamm_quote_chain::prelude::{ChainError, ChainQuery, ClarityValue, CodecError, ContractId};
use cpamm_quote_domain::{FeeRatio, QuoteError, QuoteResult, TokenAmount, TokenId};
use tracing::debug;

/// Runs a read-only call and lifts failures into the quote taxonomy.
pub(crate) async fn call(
    chain: &dyn ChainQuery,
    contract: &ContractId,
    method: &str,
    args: &[ClarityValue],
) -> QuoteResult<ClarityValue> {
    debug!(contract = %contract, method, "Read-only call");
    chain
        .call_read_only(contract, method, args)
        .await
        .map_err(QuoteError::from)
}

/// Maps a decoding failure of a result from `contract::method`.
pub(crate) fn malformed<'a>(
    contract: &'a ContractId,
    method: &'a str,
) -> impl Fn(CodecError) -> QuoteError + 'a {
    move |e| ChainError::decode(contract, method, e).into()
}

/// Clarity `uint` argument. Amounts beyond 128 bits cannot exist on chain.
pub(crate) fn uint_arg(amount: TokenAmount) -> QuoteResult<ClarityValue> {
    amount
        .to_u128()
        .map(ClarityValue::UInt)
        .ok_or_else(|| QuoteError::InvalidAmounts(format!("{amount} exceeds uint range")))
}

pub(crate) fn principal_arg(token: &TokenId) -> QuoteResult<ClarityValue> {
    ClarityValue::principal(token.as_str())
        .map_err(|e| QuoteError::InvalidPath(format!("{token} is not a principal: {e}")))
}

/// Fee tuple `{num, den}` as the contracts expect it.
pub(crate) fn fee_arg(fee: FeeRatio) -> ClarityValue {
    ClarityValue::tuple([
        ("num", ClarityValue::UInt(fee.numerator())),
        ("den", ClarityValue::UInt(fee.denominator())),
    ])
}

pub(crate) fn uint_field(
    value: &ClarityValue,
    name: &str,
) -> Result<TokenAmount, CodecError> {
    value
        .field(name)?
        .expect_uint()
        .map(TokenAmount::from)
}

/// Accepts both a bare value and `(ok value)`.
pub(crate) fn unwrap_ok(value: ClarityValue) -> Result<ClarityValue, CodecError> {
    match value {
        ClarityValue::ResponseOk(inner) => Ok(*inner),
        ClarityValue::ResponseErr(inner) => Err(CodecError::UnexpectedType {
            expected: "ok response",
            found: inner.type_name(),
        }),
        other => Ok(other),
    }
}
