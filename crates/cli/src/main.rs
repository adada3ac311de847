//! Command-line entry point for swaps and position management.
//!
//! Configuration comes from the environment (or a `.env` file):
//! - `SOLANA_RPC_URL`: RPC endpoint
//! - `PRIVATE_KEY`: base58-encoded secret key of the signing wallet
//! - `RAYDIUM_API_URL`, `RAYDIUM_COMPUTE_URL`: optional service overrides

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use raylp_execution::{OpenPositionOutcome, OpenPositionParams, Workflows};
use raylp_protocols::api::{DEFAULT_API_URL, DEFAULT_COMPUTE_URL, RaydiumApi};
use raylp_protocols::raydium::executor::RaydiumExecutor;
use raylp_protocols::raydium::quotes::RaydiumQuoteEngine;
use raylp_protocols::session::{Session, SolanaChainReader};
use rust_decimal::Decimal;
use std::env;
use std::sync::Arc;
use tracing::info;

/// Wrapped SOL mint.
const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Default output mint for swaps.
const DEFAULT_OUT_MINT: &str = "Ak3ovnWQnAxPSFoSNCoNYJLnJtQDCKRBH4HwhWkb6hFm";

#[derive(Parser)]
#[command(name = "raylp", version, about = "Raydium swaps and concentrated-liquidity positions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Swap through a Standard (constant-product) pool
    SwapAmm {
        /// Mint to swap out of
        #[arg(long, default_value = SOL_MINT)]
        mint_in: String,
        /// Mint to swap into
        #[arg(long, default_value = DEFAULT_OUT_MINT)]
        mint_out: String,
        /// Amount of the input mint, human readable
        #[arg(long, default_value = "0.001")]
        amount: Decimal,
    },
    /// Swap through a Concentrated pool
    SwapClmm {
        #[arg(long, default_value = SOL_MINT)]
        mint_in: String,
        #[arg(long, default_value = DEFAULT_OUT_MINT)]
        mint_out: String,
        #[arg(long, default_value = "0.001")]
        amount: Decimal,
    },
    /// Open a position in a Concentrated pool from a SOL budget
    OpenPosition {
        /// Pool id
        #[arg(long)]
        pool: String,
        /// Total SOL to commit; half is swapped into the counterpart token
        #[arg(long)]
        sol: Decimal,
        /// Half-width of the price band, in percent of the current price
        #[arg(long, default_value = "10")]
        depth: Decimal,
    },
    /// Close the wallet's position in a pool
    ClosePosition {
        #[arg(long)]
        pool: String,
    },
    /// Inspect the wallet's position in a pool
    CheckPosition {
        #[arg(long)]
        pool: String,
    },
    /// Check the position and report whether it needs rebalancing
    Manage {
        #[arg(long)]
        pool: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let rpc_url = env::var("SOLANA_RPC_URL").context("SOLANA_RPC_URL is not set")?;
    let private_key = env::var("PRIVATE_KEY").context("PRIVATE_KEY is not set")?;
    let session = Arc::new(Session::new(rpc_url, &private_key)?);
    info!(owner = %session.owner(), "Session ready");

    let api = RaydiumApi::with_urls(
        env::var("RAYDIUM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        env::var("RAYDIUM_COMPUTE_URL").unwrap_or_else(|_| DEFAULT_COMPUTE_URL.to_string()),
    );

    let workflows = Workflows::new(
        SolanaChainReader::new(Arc::clone(&session)),
        api.clone(),
        RaydiumQuoteEngine::new(Arc::clone(&session), api.clone()),
        RaydiumExecutor::new(session, api),
    );

    match cli.command {
        Command::SwapAmm {
            mint_in,
            mint_out,
            amount,
        } => {
            let signature = workflows.swap_amm(&mint_in, &mint_out, amount).await?;
            println!("{signature}");
        }
        Command::SwapClmm {
            mint_in,
            mint_out,
            amount,
        } => {
            let signature = workflows.swap_clmm(&mint_in, &mint_out, amount).await?;
            println!("{signature}");
        }
        Command::OpenPosition { pool, sol, depth } => {
            let outcome = workflows
                .open_position(OpenPositionParams {
                    pool_id: pool,
                    sol_amount: sol,
                    depth_pct: depth,
                })
                .await?;
            match outcome {
                OpenPositionOutcome::Positioned {
                    swap_signature,
                    open_signature,
                    tick_lower,
                    tick_upper,
                } => {
                    println!("swap: {swap_signature}");
                    println!("open: {open_signature}");
                    println!("range: [{tick_lower}, {tick_upper}]");
                }
                OpenPositionOutcome::FailedPartial {
                    swap_signature,
                    reason,
                } => {
                    bail!(
                        "position not opened after balancing swap {swap_signature}: {reason}"
                    );
                }
            }
        }
        Command::ClosePosition { pool } => {
            let signature = workflows.close_position(&pool).await?;
            println!("{signature}");
        }
        Command::CheckPosition { pool } => {
            let report = workflows.check_position(&pool).await?;
            println!("position: {}", report.nft_mint);
            println!("ticks: [{}, {}]", report.tick_lower, report.tick_upper);
            println!("prices: [{}, {}]", report.price_lower, report.price_upper);
            println!("liquidity: {}", report.liquidity);
            println!("in range: {}", report.in_range);
        }
        Command::Manage { pool } => {
            let report = workflows.manage(&pool).await?;
            println!(
                "{}: {}",
                report.nft_mint,
                if report.in_range { "in range" } else { "out of range" }
            );
        }
    }

    Ok(())
}
