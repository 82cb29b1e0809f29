//! Errors raised by chain adapters.

use crate::clarity::CodecError;
use cpamm_quote_domain::QuoteError;

/// Failure of a read-only contract call.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The node executed the call and reported a failure.
    #[error("contract call {contract}::{method} failed: {cause}")]
    Contract {
        contract: String,
        method: String,
        cause: String,
    },

    /// The node could not be reached or answered with a non-success status.
    #[error("transport error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Arguments could not be encoded, or the result could not be decoded.
    #[error("codec error in {contract}::{method}: {source}")]
    Decode {
        contract: String,
        method: String,
        #[source]
        source: CodecError,
    },
}

impl ChainError {
    pub fn decode(
        contract: impl ToString,
        method: impl Into<String>,
        source: CodecError,
    ) -> Self {
        Self::Decode {
            contract: contract.to_string(),
            method: method.into(),
            source,
        }
    }
}

impl From<ChainError> for QuoteError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Contract {
                contract,
                method,
                cause,
            } => QuoteError::Contract {
                contract,
                method,
                message: cause,
                source: None,
            },
            ChainError::Network { message, source } => QuoteError::Network {
                message,
                source: source.map(|e| Box::new(e) as _),
            },
            ChainError::Decode {
                contract,
                method,
                source,
            } => QuoteError::Contract {
                contract,
                method,
                message: format!("unexpected result: {source}"),
                source: Some(Box::new(source)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpamm_quote_domain::ErrorKind;

    #[test]
    fn test_decode_maps_to_contract_error() {
        let err = ChainError::decode("SP1.core", "get-pool", CodecError::UnexpectedEof);
        let quote: QuoteError = err.into();
        assert_eq!(quote.kind(), ErrorKind::ContractError);
        assert!(std::error::Error::source(&quote).is_some());
    }

    #[test]
    fn test_network_maps_to_network_error() {
        let err = ChainError::Network {
            message: "connection refused".into(),
            source: None,
        };
        let quote: QuoteError = err.into();
        assert_eq!(quote.kind(), ErrorKind::NetworkError);
    }
}
