//! Collaborator surface for the Raydium position manager.
//!
//! The workflows in `raylp-execution` only ever talk to the four traits
//! defined here; the concrete implementations (Raydium's pool-info and
//! swap-compute HTTP services, the Solana RPC, and the hand-built program
//! instructions) live in the submodules.

/// Raydium HTTP API client (pool registry, pool keys, swap compute).
pub mod api;
/// Convenient imports.
pub mod prelude;
/// Raydium program state, quoting and transaction building.
pub mod raydium;
/// Solana RPC wrapper.
pub mod rpc;
/// Process-wide authenticated session.
pub mod session;

use anyhow::Result;
use async_trait::async_trait;
use raylp_domain::entities::{ClmmPosition, MintInfo, PoolInfo, SwapQuote, TickArrayCache};

/// Read-only chain lookups that are not pool specific.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fetches a mint account and returns its address and decimal precision.
    async fn mint_info(&self, mint: &str) -> Result<MintInfo>;

    /// Current epoch number.
    async fn epoch(&self) -> Result<u64>;
}

/// Pool discovery, by mint pair or by id.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    async fn pools_by_mints(&self, mint_a: &str, mint_b: &str) -> Result<Vec<PoolInfo>>;

    async fn pool_by_id(&self, id: &str) -> Result<Option<PoolInfo>>;
}

/// Quoting: reserve and tick-array state plus slippage-adjusted outputs.
#[async_trait]
pub trait QuoteEngine: Send + Sync {
    /// Current vault balances of a Standard pool, in (mint A, mint B) order.
    async fn amm_reserves(&self, pool: &PoolInfo) -> Result<(u64, u64)>;

    /// Initialized tick arrays around a Concentrated pool's current tick.
    async fn tick_arrays(&self, pool: &PoolInfo) -> Result<TickArrayCache>;

    /// Reserve-based constant-product quote.
    fn amm_quote(
        &self,
        pool: &PoolInfo,
        reserves: (u64, u64),
        amount_in: u64,
        slippage: f64,
    ) -> Result<SwapQuote>;

    /// Concentrated-liquidity quote for a swap out of `input_mint`.
    async fn clmm_quote(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        tick_arrays: &TickArrayCache,
        amount_in: u64,
        slippage: f64,
        epoch: u64,
    ) -> Result<SwapQuote>;

    /// Maximum counterpart (mint B) amount matching a base-side deposit of
    /// `base_amount` into `[tick_lower, tick_upper]`.
    async fn liquidity_from_base(
        &self,
        pool: &PoolInfo,
        tick_lower: i32,
        tick_upper: i32,
        base_amount: u64,
    ) -> Result<u64>;
}

/// Transaction construction, signing and submission. Every method confirms
/// the transaction and returns its signature. Swap methods take the input
/// mint so the built instruction trades the same direction as the quote.
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
    async fn swap_amm(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        amount_in: u64,
        min_amount_out: u64,
    ) -> Result<String>;

    async fn swap_clmm(
        &self,
        pool: &PoolInfo,
        input_mint: &str,
        amount_in: u64,
        quote: &SwapQuote,
    ) -> Result<String>;

    async fn open_position(
        &self,
        pool: &PoolInfo,
        tick_lower: i32,
        tick_upper: i32,
        base_amount: u64,
        other_amount_max: u64,
    ) -> Result<String>;

    async fn close_position(&self, pool: &PoolInfo, position: &ClmmPosition) -> Result<String>;

    /// All CLMM positions the session owner holds under `program_id`.
    async fn owner_positions(&self, program_id: &str) -> Result<Vec<ClmmPosition>>;
}
