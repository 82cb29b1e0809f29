use crate::clarity::ClarityValue;
use crate::contract::ContractId;
use crate::error::ChainError;
use async_trait::async_trait;
use std::sync::Arc;

/// A read-only call target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub contract: ContractId,
    pub method: String,
    pub args: Vec<ClarityValue>,
}

impl ReadCall {
    pub fn new(contract: ContractId, method: impl Into<String>, args: Vec<ClarityValue>) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
        }
    }
}

/// Derives a follow-up call from the result of a first call, or `None`
/// when there is nothing to follow.
pub type FollowUp = fn(&ClarityValue) -> Option<ReadCall>;

/// Results of a chained read: the first call and its follow-up, if any.
pub type ChainedRead = (ClarityValue, Option<ClarityValue>);

/// Read-only access to deployed contracts.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Identifies the backing node, used to partition caches.
    fn provider(&self) -> &str;

    /// Calls `method` on `contract` with `args` and returns the decoded result.
    async fn call_read_only(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ChainError>;

    /// Runs `first`, then the call `then` derives from its result, as one
    /// snapshot. Caching layers store and expire both results together.
    async fn call_read_only_chained(
        &self,
        first: &ReadCall,
        then: FollowUp,
    ) -> Result<ChainedRead, ChainError> {
        let head = self
            .call_read_only(&first.contract, &first.method, &first.args)
            .await?;
        let tail = match then(&head) {
            Some(next) => Some(
                self.call_read_only(&next.contract, &next.method, &next.args)
                    .await?,
            ),
            None => None,
        };
        Ok((head, tail))
    }
}

#[async_trait]
impl<T: ChainQuery + ?Sized> ChainQuery for Arc<T> {
    fn provider(&self) -> &str {
        (**self).provider()
    }

    async fn call_read_only(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ChainError> {
        (**self).call_read_only(contract, method, args).await
    }

    async fn call_read_only_chained(
        &self,
        first: &ReadCall,
        then: FollowUp,
    ) -> Result<ChainedRead, ChainError> {
        (**self).call_read_only_chained(first, then).await
    }
}
