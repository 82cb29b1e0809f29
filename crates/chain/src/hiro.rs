//! Stacks node client for read-only contract calls.
//!
//! Talks to the `/v2/contracts/call-read` endpoint exposed by Stacks nodes
//! and the Hiro API.

use crate::clarity::ClarityValue;
use crate::contract::ContractId;
use crate::error::ChainError;
use crate::query::ChainQuery;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Public mainnet endpoint.
pub const MAINNET_API_URL: &str = "https://api.hiro.so";

/// Configuration for [`HiroClient`].
#[derive(Debug, Clone)]
pub struct HiroConfig {
    /// Base URL of the node or API, without trailing slash.
    pub base_url: String,
    /// Optional key sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Principal the node evaluates calls as.
    pub sender: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HiroConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_API_URL.to_string(),
            api_key: None,
            sender: "SP000000000000000000002Q6VF78".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize)]
struct CallReadRequest<'a> {
    sender: &'a str,
    arguments: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CallReadResponse {
    okay: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    cause: Option<String>,
}

/// HTTP implementation of [`ChainQuery`].
pub struct HiroClient {
    http: reqwest::Client,
    config: HiroConfig,
}

impl HiroClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HiroConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChainError::Network {
                message: "failed to build HTTP client".to_string(),
                source: Some(e),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HiroConfig {
        &self.config
    }

    fn endpoint(&self, contract: &ContractId, method: &str) -> String {
        format!(
            "{}/v2/contracts/call-read/{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            contract.address,
            contract.name,
            method
        )
    }
}

#[async_trait]
impl ChainQuery for HiroClient {
    fn provider(&self) -> &str {
        &self.config.base_url
    }

    async fn call_read_only(
        &self,
        contract: &ContractId,
        method: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ChainError> {
        let arguments = args
            .iter()
            .map(ClarityValue::to_hex)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ChainError::decode(contract, method, e))?;

        let body = CallReadRequest {
            sender: &self.config.sender,
            arguments,
        };

        debug!(contract = %contract, method, args = args.len(), "Calling read-only function");

        let mut request = self.http.post(self.endpoint(contract, method)).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| ChainError::Network {
            message: format!("request to {contract}::{method} failed"),
            source: Some(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Network {
                message: format!("{contract}::{method} returned HTTP {status}: {text}"),
                source: None,
            });
        }

        let payload: CallReadResponse = response.json().await.map_err(|e| ChainError::Network {
            message: format!("malformed response from {contract}::{method}"),
            source: Some(e),
        })?;

        if !payload.okay {
            return Err(ChainError::Contract {
                contract: contract.to_string(),
                method: method.to_string(),
                cause: payload.cause.unwrap_or_else(|| "unknown cause".to_string()),
            });
        }

        let result = payload.result.ok_or_else(|| ChainError::Contract {
            contract: contract.to_string(),
            method: method.to_string(),
            cause: "response carried no result".to_string(),
        })?;

        ClarityValue::from_hex(&result).map_err(|e| ChainError::decode(contract, method, e))
    }
}
