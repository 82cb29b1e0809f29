//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router with every endpoint under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    let pools = Router::new()
        .route("/", get(handlers::get_pool_by_pair))
        .route("/batch", post(handlers::get_pools))
        .route("/{id}", get(handlers::get_pool));

    let quotes = Router::new()
        .route("/swap", post(handlers::swap_quote))
        .route("/swap/exact-output", post(handlers::swap_quote_exact_output))
        .route("/multi-hop", post(handlers::multi_hop_quote))
        .route(
            "/multi-hop/exact-output",
            post(handlers::multi_hop_quote_exact_output),
        )
        .route("/batch", post(handlers::batch_swap_quotes))
        .route("/liquidity", post(handlers::liquidity_quote))
        .route("/liquidity/lp-tokens", post(handlers::liquidity_tokens))
        .route("/liquidity/batch", post(handlers::batch_liquidity_quotes))
        .route("/remove-liquidity", post(handlers::removal_quote))
        .route(
            "/remove-liquidity/range",
            post(handlers::removal_range_quotes),
        )
        .route(
            "/remove-liquidity/batch",
            post(handlers::batch_removal_quotes),
        );

    let api = Router::new()
        .route("/health", get(handlers::health))
        .nest("/pools", pools)
        .nest("/quotes", quotes);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
