//! Request and response bodies.
//!
//! Token amounts travel as decimal strings.

use cpamm_quote_domain::{PoolId, SwapQuote, TokenAmount, TokenId};
use cpamm_quote_engine::prelude::{LiquidityQuoteRequest, RemovalQuoteRequest, RouteQuery};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub node: String,
    pub math_source: String,
}

/// Query string of `GET /pools`.
#[derive(Debug, Clone, Deserialize)]
pub struct PairQuery {
    pub token0: TokenId,
    pub token1: TokenId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolBatchRequest {
    pub pool_ids: Vec<PoolId>,
}

/// Exact-input swap between two tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub amount_in: TokenAmount,
    /// Adds `minimumReceived` to the response.
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

/// Exact-output swap between two tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactOutputSwapRequest {
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub amount_out: TokenAmount,
    /// Adds `maximumSent` to the response.
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiHopRequest {
    pub path: Vec<TokenId>,
    pub amount_in: TokenAmount,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiHopExactOutputRequest {
    pub path: Vec<TokenId>,
    pub amount_out: TokenAmount,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
}

/// Swap quote with optional slippage bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteResponse {
    #[serde(flatten)]
    pub quote: SwapQuote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_received: Option<TokenAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_sent: Option<TokenAmount>,
}

impl From<SwapQuote> for SwapQuoteResponse {
    fn from(quote: SwapQuote) -> Self {
        Self {
            quote,
            minimum_received: None,
            maximum_sent: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSwapRequest {
    pub queries: Vec<RouteQuery>,
}

/// Body of `POST /quotes/liquidity/lp-tokens`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpTokensRequest {
    pub pool_id: PoolId,
    pub amount0: TokenAmount,
    pub amount1: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LpTokensResponse {
    pub pool_id: PoolId,
    pub liquidity_tokens: TokenAmount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchLiquidityRequest {
    pub requests: Vec<LiquidityQuoteRequest>,
}

/// Body of `POST /quotes/remove-liquidity/range`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRangeRequest {
    pub pool_id: PoolId,
    pub total_liquidity: TokenAmount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRemovalRequest {
    pub requests: Vec<RemovalQuoteRequest>,
}
