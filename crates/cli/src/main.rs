//! Command line interface for the constant-product quote engine.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cpamm_quote_api::{ApiServer, AppState, ServerConfig};
use cpamm_quote_domain::{PoolId, SwapQuote, TokenAmount, TokenId};
use cpamm_quote_engine::prelude::{EngineConfig, MathSource, QuoteEngine};
use dotenv::dotenv;
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "cpamm-quote")]
#[command(about = "Quotes swaps and liquidity changes on constant-product pools", long_about = None)]
struct Cli {
    /// Compute amounts locally instead of calling the library contracts
    #[arg(long, global = true)]
    local_math: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a pool by id
    Pool {
        /// Pool id as assigned by the core contract
        id: String,
    },
    /// Show the pool for a token pair, in either order
    Pair { token0: String, token1: String },
    /// Quote an exact-input swap
    Swap {
        token_in: String,
        token_out: String,
        amount_in: TokenAmount,
        /// Slippage tolerance in basis points
        #[arg(long)]
        slippage_bps: Option<u32>,
    },
    /// Quote the input needed for an exact output
    SwapExactOut {
        token_in: String,
        token_out: String,
        amount_out: TokenAmount,
        #[arg(long)]
        slippage_bps: Option<u32>,
    },
    /// Quote an exact-input swap along a token path
    Route {
        /// Amount of the first token
        amount_in: TokenAmount,
        /// At least two tokens, first is sold and last is bought
        #[arg(required = true, num_args = 2..)]
        path: Vec<String>,
    },
    /// Quote a deposit
    AddLiquidity {
        pool_id: String,
        amount0: TokenAmount,
        amount1: TokenAmount,
        #[arg(long, default_value = "0")]
        amount0_min: TokenAmount,
        #[arg(long, default_value = "0")]
        amount1_min: TokenAmount,
    },
    /// LP tokens minted for a deposit
    LpTokens {
        pool_id: String,
        amount0: TokenAmount,
        amount1: TokenAmount,
    },
    /// Quote burning LP tokens
    RemoveLiquidity {
        pool_id: String,
        liquidity: TokenAmount,
    },
    /// Quote burning 25%, 50%, 75% and 100% of a holding
    RemoveRange {
        pool_id: String,
        total_liquidity: TokenAmount,
    },
    /// Start the REST API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn slippage_note(quote: &SwapQuote, bps: u32, exact_output: bool) -> Result<String> {
    Ok(if exact_output {
        format!("🛡️  Maximum sent at {bps} bps: {}", quote.maximum_sent(bps)?)
    } else {
        format!("🛡️  Minimum received at {bps} bps: {}", quote.minimum_received(bps)?)
    })
}

/// Prints the quote JSON on stdout and the slippage bound on stderr, so
/// stdout stays parseable.
fn print_swap(quote: &SwapQuote, slippage_bps: Option<u32>, exact_output: bool) -> Result<()> {
    print_json(quote)?;
    if let Some(bps) = slippage_bps {
        eprintln!("{}", slippage_note(quote, bps, exact_output)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env().context("invalid CPAMM_* configuration")?;
    if cli.local_math {
        config.math_source = MathSource::Local;
    }
    let engine = QuoteEngine::from_config(config)?;

    match cli.command {
        Commands::Pool { id } => {
            eprintln!("📡 Fetching pool {id}...");
            let pool = engine.pools().get_pool_by_id(&PoolId::new(id)).await?;
            print_json(&pool)?;
        }
        Commands::Pair { token0, token1 } => {
            let pool = engine
                .pools()
                .get_pool(&TokenId::new(token0), &TokenId::new(token1))
                .await?;
            print_json(&pool)?;
        }
        Commands::Swap {
            token_in,
            token_out,
            amount_in,
            slippage_bps,
        } => {
            let quote = engine
                .swaps()
                .get_swap_quote(&TokenId::new(token_in), &TokenId::new(token_out), amount_in)
                .await?;
            print_swap(&quote, slippage_bps, false)?;
        }
        Commands::SwapExactOut {
            token_in,
            token_out,
            amount_out,
            slippage_bps,
        } => {
            let quote = engine
                .swaps()
                .get_swap_quote_for_exact_output(
                    &TokenId::new(token_in),
                    &TokenId::new(token_out),
                    amount_out,
                )
                .await?;
            print_swap(&quote, slippage_bps, true)?;
        }
        Commands::Route { amount_in, path } => {
            let path: Vec<TokenId> = path.into_iter().map(TokenId::new).collect();
            eprintln!("🔍 Quoting {} hop route...", path.len().saturating_sub(1));
            let quote = engine.swaps().get_multi_hop_quote(&path, amount_in).await?;
            print_json(&quote)?;
        }
        Commands::AddLiquidity {
            pool_id,
            amount0,
            amount1,
            amount0_min,
            amount1_min,
        } => {
            let quote = engine
                .liquidity()
                .get_liquidity_quote(
                    &PoolId::new(pool_id),
                    amount0,
                    amount1,
                    amount0_min,
                    amount1_min,
                )
                .await?;
            print_json(&quote)?;
        }
        Commands::LpTokens {
            pool_id,
            amount0,
            amount1,
        } => {
            let minted = engine
                .liquidity()
                .calculate_liquidity_tokens(&PoolId::new(pool_id), amount0, amount1)
                .await?;
            println!("✅ LP tokens minted: {minted}");
        }
        Commands::RemoveLiquidity { pool_id, liquidity } => {
            let quote = engine
                .removals()
                .get_remove_liquidity_quote(&PoolId::new(pool_id), liquidity)
                .await?;
            print_json(&quote)?;
        }
        Commands::RemoveRange {
            pool_id,
            total_liquidity,
        } => {
            let quotes = engine
                .removals()
                .get_remove_liquidity_range_quotes(&PoolId::new(pool_id), total_liquidity)
                .await?;
            print_json(&quotes)?;
        }
        Commands::Serve { host, port } => {
            let mut server = ServerConfig::from_env();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            info!(address = %server.bind_address(), "Starting API server");
            ApiServer::new(server, AppState::new(engine)).run().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote() -> SwapQuote {
        SwapQuote {
            route: vec![TokenId::from("SP1.wstx"), TokenId::from("SP2.usda")],
            amount_in: TokenAmount::from(10_000u64),
            amount_out: TokenAmount::from(19_743u64),
            price_impact: 0.99,
        }
    }

    #[test]
    fn test_slippage_note_picks_bound() {
        let q = quote();
        let min = slippage_note(&q, 50, false).unwrap();
        assert!(min.contains("Minimum received at 50 bps"), "{min}");
        assert!(min.ends_with(&q.minimum_received(50).unwrap().to_string()));

        let max = slippage_note(&q, 50, true).unwrap();
        assert!(max.contains("Maximum sent at 50 bps"), "{max}");
        assert!(max.ends_with(&q.maximum_sent(50).unwrap().to_string()));
    }

    #[test]
    fn test_cli_parses_route() {
        let cli = Cli::try_parse_from([
            "cpamm-quote",
            "--local-math",
            "route",
            "100",
            "SP1.wstx",
            "SP2.usda",
        ])
        .unwrap();
        assert!(cli.local_math);
        assert!(matches!(cli.command, Commands::Route { ref path, .. } if path.len() == 2));
    }
}
