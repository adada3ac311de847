//! Swap and position workflows.
//!
//! A [`Workflows`] instance wires the four collaborator traits together and
//! drives every operation the command surface exposes: AMM and CLMM swaps,
//! opening a banded position from a SOL budget, closing a position and
//! inspecting one. The workflows never talk to the network directly; all
//! chain and HTTP traffic goes through the trait objects they are built
//! with, which keeps them testable against in-memory fakes.

/// Position lifecycle: open, close, inspect, manage.
pub mod position;
/// Swap orchestration for Standard and Concentrated pools.
pub mod swap;

pub use position::{OpenPositionOutcome, OpenPositionParams, PositionReport};

use raylp_protocols::{ChainReader, PoolRegistry, QuoteEngine, TransactionBuilder};

/// Slippage tolerance applied to every quote, as a fraction.
pub const DEFAULT_SLIPPAGE: f64 = 0.01;

/// Entry point for all workflows, generic over its collaborators.
pub struct Workflows<C, R, Q, T>
where
    C: ChainReader,
    R: PoolRegistry,
    Q: QuoteEngine,
    T: TransactionBuilder,
{
    pub(crate) chain: C,
    pub(crate) registry: R,
    pub(crate) quotes: Q,
    pub(crate) executor: T,
    pub(crate) slippage: f64,
}

impl<C, R, Q, T> Workflows<C, R, Q, T>
where
    C: ChainReader,
    R: PoolRegistry,
    Q: QuoteEngine,
    T: TransactionBuilder,
{
    pub fn new(chain: C, registry: R, quotes: Q, executor: T) -> Self {
        Self {
            chain,
            registry,
            quotes,
            executor,
            slippage: DEFAULT_SLIPPAGE,
        }
    }

    #[must_use]
    pub fn with_slippage(mut self, slippage: f64) -> Self {
        self.slippage = slippage;
        self
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use raylp_domain::entities::{ClmmPosition, MintInfo, PoolInfo, SwapQuote, TickArrayCache};
    use raylp_domain::enums::PoolType;
    use raylp_domain::math::constant_product::{amm_swap_output, apply_slippage};
    use raylp_protocols::{ChainReader, PoolRegistry, QuoteEngine, TransactionBuilder};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
    pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    pub fn standard_pool() -> PoolInfo {
        PoolInfo {
            id: "amm-pool".to_string(),
            program_id: "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8".to_string(),
            pool_type: PoolType::Standard,
            mint_a: MintInfo::new(SOL_MINT, 9),
            mint_b: MintInfo::new(USDC_MINT, 6),
            price: dec!(150),
            fee_bps: 25,
            tick_spacing: None,
        }
    }

    pub fn concentrated_pool() -> PoolInfo {
        PoolInfo {
            id: "clmm-pool".to_string(),
            program_id: "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK".to_string(),
            pool_type: PoolType::Concentrated,
            mint_a: MintInfo::new(SOL_MINT, 9),
            mint_b: MintInfo::new(USDC_MINT, 6),
            price: dec!(150),
            fee_bps: 25,
            tick_spacing: Some(10),
        }
    }

    pub struct MockChain {
        pub decimals: u8,
    }

    #[async_trait]
    impl ChainReader for MockChain {
        async fn mint_info(&self, mint: &str) -> Result<MintInfo> {
            Ok(MintInfo::new(mint, self.decimals))
        }

        async fn epoch(&self) -> Result<u64> {
            Ok(500)
        }
    }

    pub struct MockRegistry {
        pub pools: Vec<PoolInfo>,
    }

    #[async_trait]
    impl PoolRegistry for MockRegistry {
        async fn pools_by_mints(&self, _mint_a: &str, _mint_b: &str) -> Result<Vec<PoolInfo>> {
            Ok(self.pools.clone())
        }

        async fn pool_by_id(&self, id: &str) -> Result<Option<PoolInfo>> {
            Ok(self.pools.iter().find(|p| p.id == id).cloned())
        }
    }

    pub struct MockQuotes {
        pub reserves: (u64, u64),
        pub clmm_min_out: u64,
        pub counterpart: u64,
    }

    impl Default for MockQuotes {
        fn default() -> Self {
            Self {
                reserves: (1_000_000_000, 2_000_000_000),
                clmm_min_out: 148_500,
                counterpart: 75_000_000,
            }
        }
    }

    #[async_trait]
    impl QuoteEngine for MockQuotes {
        async fn amm_reserves(&self, _pool: &PoolInfo) -> Result<(u64, u64)> {
            Ok(self.reserves)
        }

        async fn tick_arrays(&self, pool: &PoolInfo) -> Result<TickArrayCache> {
            Ok(TickArrayCache {
                pool_id: pool.id.clone(),
                addresses: vec!["tick-array-0".to_string(), "tick-array-1".to_string()],
            })
        }

        fn amm_quote(
            &self,
            pool: &PoolInfo,
            reserves: (u64, u64),
            amount_in: u64,
            slippage: f64,
        ) -> Result<SwapQuote> {
            let out = amm_swap_output(amount_in, reserves.0, reserves.1, pool.fee_bps)
                .map_err(anyhow::Error::msg)?;
            Ok(SwapQuote {
                min_amount_out: apply_slippage(out, slippage).map_err(anyhow::Error::msg)?,
                remaining_accounts: Vec::new(),
            })
        }

        async fn clmm_quote(
            &self,
            pool: &PoolInfo,
            input_mint: &str,
            tick_arrays: &TickArrayCache,
            _amount_in: u64,
            _slippage: f64,
            _epoch: u64,
        ) -> Result<SwapQuote> {
            pool.orient(input_mint)?;
            Ok(SwapQuote {
                min_amount_out: self.clmm_min_out,
                remaining_accounts: tick_arrays.addresses.clone(),
            })
        }

        async fn liquidity_from_base(
            &self,
            _pool: &PoolInfo,
            _tick_lower: i32,
            _tick_upper: i32,
            _base_amount: u64,
        ) -> Result<u64> {
            Ok(self.counterpart)
        }
    }

    #[derive(Default)]
    pub struct MockExecutor {
        pub calls: Mutex<Vec<String>>,
        pub fail_open: bool,
        pub positions: Vec<ClmmPosition>,
    }

    impl MockExecutor {
        pub fn recorded(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl TransactionBuilder for MockExecutor {
        async fn swap_amm(
            &self,
            pool: &PoolInfo,
            input_mint: &str,
            amount_in: u64,
            min_amount_out: u64,
        ) -> Result<String> {
            self.record(format!(
                "swap_amm:{}:{input_mint}:{amount_in}:{min_amount_out}",
                pool.id
            ));
            Ok("amm-signature".to_string())
        }

        async fn swap_clmm(
            &self,
            pool: &PoolInfo,
            input_mint: &str,
            amount_in: u64,
            quote: &SwapQuote,
        ) -> Result<String> {
            self.record(format!(
                "swap_clmm:{}:{input_mint}:{amount_in}:{}",
                pool.id, quote.min_amount_out
            ));
            Ok("clmm-signature".to_string())
        }

        async fn open_position(
            &self,
            pool: &PoolInfo,
            tick_lower: i32,
            tick_upper: i32,
            base_amount: u64,
            other_amount_max: u64,
        ) -> Result<String> {
            if self.fail_open {
                return Err(anyhow!("simulated open failure"));
            }
            self.record(format!(
                "open_position:{}:{tick_lower}:{tick_upper}:{base_amount}:{other_amount_max}",
                pool.id
            ));
            Ok("open-signature".to_string())
        }

        async fn close_position(
            &self,
            pool: &PoolInfo,
            position: &ClmmPosition,
        ) -> Result<String> {
            self.record(format!("close_position:{}:{}", pool.id, position.nft_mint));
            Ok("close-signature".to_string())
        }

        async fn owner_positions(&self, _program_id: &str) -> Result<Vec<ClmmPosition>> {
            Ok(self.positions.clone())
        }
    }
}
