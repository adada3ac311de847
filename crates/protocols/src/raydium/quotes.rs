//! Quote engine backed by vault balances, on-chain tick arrays and
//! Raydium's swap-compute service.

use crate::QuoteEngine;
use crate::api::RaydiumApi;
use crate::raydium::state::{self, PoolState};
use crate::session::Session;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use raylp_domain::entities::{PoolInfo, SwapQuote, TickArrayCache};
use raylp_domain::math::constant_product::{amm_swap_output, apply_slippage};
use raylp_domain::math::liquidity::counterpart_amount1;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Tick arrays fetched on each side of the active one.
const TICK_ARRAY_FETCH_RADIUS: i32 = 2;

pub struct RaydiumQuoteEngine {
    session: Arc<Session>,
    api: RaydiumApi,
}

impl RaydiumQuoteEngine {
    pub fn new(session: Arc<Session>, api: RaydiumApi) -> Self {
        Self { session, api }
    }

    async fn pool_state(&self, pool: &PoolInfo) -> Result<PoolState> {
        let address = Pubkey::from_str(&pool.id)
            .with_context(|| format!("Invalid pool address {}", pool.id))?;
        let data = self.session.rpc().account_data(&address).await?;
        PoolState::parse(&data)
    }
}

#[async_trait]
impl QuoteEngine for RaydiumQuoteEngine {
    async fn amm_reserves(&self, pool: &PoolInfo) -> Result<(u64, u64)> {
        let keys = self.api.pool_keys(&pool.id).await?;
        let vault_a = Pubkey::from_str(&keys.vault.a).context("Invalid vault A address")?;
        let vault_b = Pubkey::from_str(&keys.vault.b).context("Invalid vault B address")?;
        let reserve_a = self.session.rpc().token_balance(&vault_a).await?;
        let reserve_b = self.session.rpc().token_balance(&vault_b).await?;
        debug!(pool = %pool.id, reserve_a, reserve_b, "Fetched pool reserves");
        Ok((reserve_a, reserve_b))
    }

    async fn tick_arrays(&self, pool: &PoolInfo) -> Result<TickArrayCache> {
        let pool_state = self.pool_state(pool).await?;
        let program = Pubkey::from_str(&pool.program_id)
            .with_context(|| format!("Invalid program id {}", pool.program_id))?;
        let pool_key = Pubkey::from_str(&pool.id).context("Invalid pool address")?;

        let span = state::TICK_ARRAY_SIZE * i32::from(pool_state.tick_spacing.max(1));
        let base = state::tick_array_start_index(pool_state.tick_current, pool_state.tick_spacing);
        let candidates: Vec<Pubkey> = (-TICK_ARRAY_FETCH_RADIUS..=TICK_ARRAY_FETCH_RADIUS)
            .map(|offset| state::tick_array_pda(&program, &pool_key, base + offset * span))
            .collect();

        let accounts = self.session.rpc().multiple_accounts(&candidates).await?;
        let addresses: Vec<String> = candidates
            .iter()
            .zip(&accounts)
            .filter(|(_, account)| account.is_some())
            .map(|(address, _)| address.to_string())
            .collect();
        if addresses.is_empty() {
            bail!(
                "No initialized tick arrays around tick {} of pool {}",
                pool_state.tick_current,
                pool.id
            );
        }
        debug!(pool = %pool.id, count = addresses.len(), "Fetched tick arrays");
        Ok(TickArrayCache {
            pool_id: pool.id.clone(),
            addresses,
        })
    }

    fn amm_quote(
        &self,
        pool: &PoolInfo,
        reserves: (u64, u64),
        amount_in: u64,
        slippage: f64,
    ) -> Result<SwapQuote> {
        let amount_out = amm_swap_output(amount_in, reserves.0, reserves.1, pool.fee_bps)
            .map_err(anyhow::Error::msg)?;
        let min_amount_out = apply_slippage(amount_out, slippage).map_err(anyhow::Error::msg)?;
        Ok(SwapQuote {
            min_amount_out,
            remaining_accounts: Vec::new(),
        })
    }

    async fn clmm_quote(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        tick_arrays: &TickArrayCache,
        amount_in: u64,
        slippage: f64,
        epoch: u64,
    ) -> Result<SwapQuote> {
        let (input, output) = pool.orient(input_mint)?;
        let slippage_bps = (slippage * 10_000.0).round() as u32;
        debug!(pool = %pool.id, input_mint, epoch, amount_in, "Requesting swap compute");
        let compute = self
            .api
            .compute_swap_base_in(&input.address, &output.address, amount_in, slippage_bps)
            .await?;
        let min_amount_out = compute
            .other_amount_threshold
            .parse()
            .context("Swap compute threshold is not a u64")?;
        Ok(SwapQuote {
            min_amount_out,
            remaining_accounts: tick_arrays.addresses.clone(),
        })
    }

    async fn liquidity_from_base(
        &self,
        pool: &PoolInfo,
        tick_lower: i32,
        tick_upper: i32,
        base_amount: u64,
    ) -> Result<u64> {
        let pool_state = self.pool_state(pool).await?;
        counterpart_amount1(base_amount, pool_state.tick_current, tick_lower, tick_upper)
            .map_err(anyhow::Error::msg)
    }
}
