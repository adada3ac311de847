//! Swap workflows for Standard (constant-product) and Concentrated pools.
//!
//! Both follow the same shape: resolve the input mint's precision, find a
//! pool of the right type for the mint pair, quote with the configured
//! slippage and submit. Amounts are taken as human-readable decimals and
//! scaled by the mint's precision before anything else happens.

use crate::Workflows;
use anyhow::{Context, Result};
use raylp_domain::entities::PoolInfo;
use raylp_domain::enums::PoolType;
use raylp_domain::errors::WorkflowError;
use raylp_domain::value_objects::amount::to_base_units;
use raylp_protocols::{ChainReader, PoolRegistry, QuoteEngine, TransactionBuilder};
use rust_decimal::Decimal;
use tracing::{debug, info};

impl<C, R, Q, T> Workflows<C, R, Q, T>
where
    C: ChainReader,
    R: PoolRegistry,
    Q: QuoteEngine,
    T: TransactionBuilder,
{
    /// Swaps `amount` of `mint_in` for `mint_out` through a Standard pool.
    ///
    /// Returns the confirmed transaction signature.
    pub async fn swap_amm(
        &self,
        mint_in: &str,
        mint_out: &str,
        amount: Decimal,
    ) -> Result<String> {
        let mint = self.chain.mint_info(mint_in).await?;
        let amount_in = to_base_units(amount, mint.decimals)?;

        let pools = self.registry.pools_by_mints(mint_in, mint_out).await?;
        let pool = pools
            .iter()
            .find(|p| p.pool_type == PoolType::Standard)
            .ok_or(WorkflowError::NoPoolForPair(PoolType::Standard))?;
        debug!(pool = %pool.id, amount_in, "Selected Standard pool");

        let reserves = self.quotes.amm_reserves(pool).await?;
        // Vault balances come back in (mint A, mint B) order; flip them when
        // swapping out of mint B.
        let (input, _) = pool.orient(mint_in)?;
        let oriented = if input.address == pool.mint_a.address {
            reserves
        } else {
            (reserves.1, reserves.0)
        };
        let quote = self.quotes.amm_quote(pool, oriented, amount_in, self.slippage)?;

        let signature = self
            .executor
            .swap_amm(pool, mint_in, amount_in, quote.min_amount_out)
            .await?;
        info!(pool = %pool.id, %signature, "AMM swap confirmed");
        Ok(signature)
    }

    /// Swaps `amount` of `mint_in` for `mint_out` through a Concentrated pool.
    pub async fn swap_clmm(
        &self,
        mint_in: &str,
        mint_out: &str,
        amount: Decimal,
    ) -> Result<String> {
        let mint = self.chain.mint_info(mint_in).await?;
        let amount_in = to_base_units(amount, mint.decimals)?;

        let pools = self.registry.pools_by_mints(mint_in, mint_out).await?;
        let pool = pools
            .iter()
            .find(|p| p.pool_type == PoolType::Concentrated)
            .ok_or(WorkflowError::NoPoolForPair(PoolType::Concentrated))?
            .clone();
        debug!(pool = %pool.id, amount_in, "Selected Concentrated pool");

        self.swap_clmm_in_pool(&pool, mint_in, amount_in).await
    }

    /// Executes a CLMM swap out of `input_mint` in a known pool. Shared with
    /// the open-position workflow, which balances its deposit through the
    /// target pool itself.
    pub(crate) async fn swap_clmm_in_pool(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        amount_in: u64,
    ) -> Result<String> {
        let tick_arrays = self.quotes.tick_arrays(pool).await?;
        let epoch = self
            .chain
            .epoch()
            .await
            .context("Failed to fetch current epoch")?;
        let quote = self
            .quotes
            .clmm_quote(pool, input_mint, &tick_arrays, amount_in, self.slippage, epoch)
            .await?;

        let signature = self
            .executor
            .swap_clmm(pool, input_mint, amount_in, &quote)
            .await?;
        info!(pool = %pool.id, %signature, "CLMM swap confirmed");
        Ok(signature)
    }
}
