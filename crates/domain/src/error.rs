//! Error taxonomy shared by every quoting operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Boxed cause attached to chain-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the quoting crates.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Classification tag for a [`QuoteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No pool exists for the requested id or pair.
    PoolNotFound,
    /// Reserves cannot support the requested trade or withdrawal.
    InsufficientLiquidity,
    /// A swap path is too short or does not connect.
    InvalidPath,
    /// The read-only call failed on chain.
    ContractError,
    /// Transport-level failure talking to the node.
    NetworkError,
    /// Caller-supplied amounts violate preconditions.
    InvalidAmounts,
    /// Optimal deposit is below the caller's floor.
    MinimumNotMet,
    /// Pool has no LP supply to remove from.
    ZeroLiquidity,
}

impl ErrorKind {
    /// Stable string form of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoolNotFound => "POOL_NOT_FOUND",
            Self::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            Self::InvalidPath => "INVALID_PATH",
            Self::ContractError => "CONTRACT_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::InvalidAmounts => "INVALID_AMOUNTS",
            Self::MinimumNotMet => "MINIMUM_NOT_MET",
            Self::ZeroLiquidity => "ZERO_LIQUIDITY",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by pool resolution and quote computation.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    /// No pool exists for the requested id or pair.
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    /// Reserves cannot support the request.
    #[error("insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    /// Swap path is invalid.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The read-only call itself failed on chain, or returned a value of
    /// an unexpected shape.
    #[error("contract error in {contract}::{method}: {message}")]
    Contract {
        /// Fully qualified contract id.
        contract: String,
        /// Read-only method name.
        method: String,
        /// Chain-reported cause.
        message: String,
        /// Underlying error, when there is one.
        #[source]
        source: Option<BoxError>,
    },

    /// Transport failure.
    #[error("network error: {message}")]
    Network {
        /// Human readable description.
        message: String,
        /// Underlying transport error.
        #[source]
        source: Option<BoxError>,
    },

    /// Caller-supplied amounts violate preconditions.
    #[error("invalid amounts: {0}")]
    InvalidAmounts(String),

    /// Computed deposit is below the caller's minimum.
    #[error("minimum not met: {0}")]
    MinimumNotMet(String),

    /// The pool has no LP supply.
    #[error("pool {0} has zero liquidity")]
    ZeroLiquidity(String),
}

impl QuoteError {
    /// Returns the taxonomy tag of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PoolNotFound(_) => ErrorKind::PoolNotFound,
            Self::InsufficientLiquidity(_) => ErrorKind::InsufficientLiquidity,
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::Contract { .. } => ErrorKind::ContractError,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::InvalidAmounts(_) => ErrorKind::InvalidAmounts,
            Self::MinimumNotMet(_) => ErrorKind::MinimumNotMet,
            Self::ZeroLiquidity(_) => ErrorKind::ZeroLiquidity,
        }
    }

    /// Whether a lenient batch may drop the failed item and carry on.
    ///
    /// Chain and transport failures, and malformed paths, are never
    /// item-local and abort even lenient batches.
    #[must_use]
    pub fn is_item_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PoolNotFound
                | ErrorKind::InsufficientLiquidity
                | ErrorKind::InvalidAmounts
                | ErrorKind::MinimumNotMet
                | ErrorKind::ZeroLiquidity
        )
    }

    /// Builds a contract error without an underlying cause.
    pub fn contract(
        contract: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Contract {
            contract: contract.into(),
            method: method.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Builds a network error without an underlying cause.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            QuoteError::PoolNotFound("7".into()).kind(),
            ErrorKind::PoolNotFound
        );
        assert_eq!(
            QuoteError::contract("SP1.core", "get-pool", "runtime").kind(),
            ErrorKind::ContractError
        );
        assert_eq!(QuoteError::network("timeout").kind(), ErrorKind::NetworkError);
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(QuoteError::ZeroLiquidity("1".into()).is_item_recoverable());
        assert!(QuoteError::MinimumNotMet("x".into()).is_item_recoverable());
        assert!(!QuoteError::network("down").is_item_recoverable());
        assert!(!QuoteError::InvalidPath("short".into()).is_item_recoverable());
    }

    #[test]
    fn test_kind_serializes_as_tag() {
        let json = serde_json::to_string(&ErrorKind::MinimumNotMet).unwrap();
        assert_eq!(json, "\"MINIMUM_NOT_MET\"");
        assert_eq!(ErrorKind::ZeroLiquidity.to_string(), "ZERO_LIQUIDITY");
    }

    #[test]
    fn test_contract_error_message() {
        let err = QuoteError::contract("SP1.core", "get-pool", "(err u101)");
        assert_eq!(
            err.to_string(),
            "contract error in SP1.core::get-pool: (err u101)"
        );
    }
}
