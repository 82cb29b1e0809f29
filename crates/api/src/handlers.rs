//! Request handlers.

use crate::error::ApiError;
use crate::models::{
    BatchLiquidityRequest, BatchRemovalRequest, BatchSwapRequest, ExactOutputSwapRequest,
    HealthResponse, LpTokensRequest, LpTokensResponse, MultiHopExactOutputRequest,
    MultiHopRequest, PairQuery, PoolBatchRequest, RemovalRangeRequest, SwapQuoteResponse,
    SwapRequest,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use cpamm_quote_domain::{LiquidityQuote, Pool, PoolId, RemovalQuote, SwapQuote};
use cpamm_quote_engine::prelude::{LiquidityQuoteRequest, RemovalQuoteRequest};

type ApiResult<T> = Result<Json<T>, ApiError>;
type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Attaches slippage bounds when the caller asked for them.
fn with_bounds(
    quote: SwapQuote,
    slippage_bps: Option<u32>,
    exact_output: bool,
) -> Result<SwapQuoteResponse, ApiError> {
    let Some(bps) = slippage_bps else {
        return Ok(quote.into());
    };
    let (minimum_received, maximum_sent) = if exact_output {
        (None, Some(quote.maximum_sent(bps)?))
    } else {
        (Some(quote.minimum_received(bps)?), None)
    };
    Ok(SwapQuoteResponse {
        quote,
        minimum_received,
        maximum_sent,
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.engine.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        node: config.api_url.clone(),
        math_source: config.math_source.as_str().to_string(),
    })
}

/// `GET /pools/{id}`
pub async fn get_pool(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Pool> {
    let pool = state.engine.pools().get_pool_by_id(&PoolId::new(id)).await?;
    Ok(Json(pool))
}

/// `GET /pools?token0=..&token1=..`
pub async fn get_pool_by_pair(
    State(state): State<AppState>,
    query: Result<Query<PairQuery>, QueryRejection>,
) -> ApiResult<Pool> {
    let Query(pair) = query?;
    let pool = state.engine.pools().get_pool(&pair.token0, &pair.token1).await?;
    Ok(Json(pool))
}

/// `POST /pools/batch`
pub async fn get_pools(
    State(state): State<AppState>,
    body: JsonBody<PoolBatchRequest>,
) -> ApiResult<Vec<Pool>> {
    let Json(request) = body?;
    let pools = state.engine.pools().get_pools(&request.pool_ids).await?;
    Ok(Json(pools))
}

/// `POST /quotes/swap`
pub async fn swap_quote(
    State(state): State<AppState>,
    body: JsonBody<SwapRequest>,
) -> ApiResult<SwapQuoteResponse> {
    let Json(request) = body?;
    let quote = state
        .engine
        .swaps()
        .get_swap_quote(&request.token_in, &request.token_out, request.amount_in)
        .await?;
    Ok(Json(with_bounds(quote, request.slippage_bps, false)?))
}

/// `POST /quotes/swap/exact-output`
pub async fn swap_quote_exact_output(
    State(state): State<AppState>,
    body: JsonBody<ExactOutputSwapRequest>,
) -> ApiResult<SwapQuoteResponse> {
    let Json(request) = body?;
    let quote = state
        .engine
        .swaps()
        .get_swap_quote_for_exact_output(&request.token_in, &request.token_out, request.amount_out)
        .await?;
    Ok(Json(with_bounds(quote, request.slippage_bps, true)?))
}

/// `POST /quotes/multi-hop`
pub async fn multi_hop_quote(
    State(state): State<AppState>,
    body: JsonBody<MultiHopRequest>,
) -> ApiResult<SwapQuoteResponse> {
    let Json(request) = body?;
    let quote = state
        .engine
        .swaps()
        .get_multi_hop_quote(&request.path, request.amount_in)
        .await?;
    Ok(Json(with_bounds(quote, request.slippage_bps, false)?))
}

/// `POST /quotes/multi-hop/exact-output`
pub async fn multi_hop_quote_exact_output(
    State(state): State<AppState>,
    body: JsonBody<MultiHopExactOutputRequest>,
) -> ApiResult<SwapQuoteResponse> {
    let Json(request) = body?;
    let quote = state
        .engine
        .swaps()
        .get_multi_hop_quote_for_exact_output(&request.path, request.amount_out)
        .await?;
    Ok(Json(with_bounds(quote, request.slippage_bps, true)?))
}

/// `POST /quotes/batch`
pub async fn batch_swap_quotes(
    State(state): State<AppState>,
    body: JsonBody<BatchSwapRequest>,
) -> ApiResult<Vec<SwapQuote>> {
    let Json(request) = body?;
    let quotes = state.engine.swaps().batch_get_quotes(&request.queries).await?;
    Ok(Json(quotes))
}

/// `POST /quotes/liquidity`
pub async fn liquidity_quote(
    State(state): State<AppState>,
    body: JsonBody<LiquidityQuoteRequest>,
) -> ApiResult<LiquidityQuote> {
    let Json(request) = body?;
    let quote = state
        .engine
        .liquidity()
        .get_liquidity_quote(
            &request.pool_id,
            request.amount0_desired,
            request.amount1_desired,
            request.amount0_min,
            request.amount1_min,
        )
        .await?;
    Ok(Json(quote))
}

/// `POST /quotes/liquidity/lp-tokens`
pub async fn liquidity_tokens(
    State(state): State<AppState>,
    body: JsonBody<LpTokensRequest>,
) -> ApiResult<LpTokensResponse> {
    let Json(request) = body?;
    let liquidity_tokens = state
        .engine
        .liquidity()
        .calculate_liquidity_tokens(&request.pool_id, request.amount0, request.amount1)
        .await?;
    Ok(Json(LpTokensResponse {
        pool_id: request.pool_id,
        liquidity_tokens,
    }))
}

/// `POST /quotes/liquidity/batch`
pub async fn batch_liquidity_quotes(
    State(state): State<AppState>,
    body: JsonBody<BatchLiquidityRequest>,
) -> ApiResult<Vec<LiquidityQuote>> {
    let Json(request) = body?;
    let quotes = state
        .engine
        .liquidity()
        .batch_get_liquidity_quotes(&request.requests)
        .await?;
    Ok(Json(quotes))
}

/// `POST /quotes/remove-liquidity`
pub async fn removal_quote(
    State(state): State<AppState>,
    body: JsonBody<RemovalQuoteRequest>,
) -> ApiResult<RemovalQuote> {
    let Json(request) = body?;
    let quote = state
        .engine
        .removals()
        .get_remove_liquidity_quote(&request.pool_id, request.liquidity_tokens)
        .await?;
    Ok(Json(quote))
}

/// `POST /quotes/remove-liquidity/range`
pub async fn removal_range_quotes(
    State(state): State<AppState>,
    body: JsonBody<RemovalRangeRequest>,
) -> ApiResult<Vec<RemovalQuote>> {
    let Json(request) = body?;
    let quotes = state
        .engine
        .removals()
        .get_remove_liquidity_range_quotes(&request.pool_id, request.total_liquidity)
        .await?;
    Ok(Json(quotes))
}

/// `POST /quotes/remove-liquidity/batch`
pub async fn batch_removal_quotes(
    State(state): State<AppState>,
    body: JsonBody<BatchRemovalRequest>,
) -> ApiResult<Vec<RemovalQuote>> {
    let Json(request) = body?;
    let quotes = state
        .engine
        .removals()
        .batch_get_remove_liquidity_quotes(&request.requests)
        .await?;
    Ok(Json(quotes))
}
