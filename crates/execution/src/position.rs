//! Position lifecycle workflows.
//!
//! Opening a position takes a SOL budget, swaps half of it into the pool's
//! counterpart token and deposits both sides into a symmetric price band
//! around the current pool price. The swap and the deposit are separate
//! transactions, so the workflow reports an explicit outcome instead of
//! pretending the pair is atomic: a failure after the swap confirmed leaves
//! funds converted but undeposited, and the caller needs to know that.

use crate::Workflows;
use anyhow::{Context, Result, ensure};
use raylp_domain::entities::{PoolInfo, find_position_for_pool};
use raylp_domain::enums::PoolType;
use raylp_domain::errors::WorkflowError;
use raylp_domain::math::price_tick::{ordered_ticks, price_to_initializable_tick, tick_to_price};
use raylp_domain::value_objects::amount::{split_half, to_lamports};
use raylp_domain::value_objects::price_range::band_around;
use raylp_protocols::{ChainReader, PoolRegistry, QuoteEngine, TransactionBuilder};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Inputs for opening a position.
#[derive(Debug, Clone)]
pub struct OpenPositionParams {
    /// Concentrated pool to deposit into.
    pub pool_id: String,
    /// Total SOL budget; half is swapped into the counterpart token.
    pub sol_amount: Decimal,
    /// Half-width of the price band, in percent of the current price.
    pub depth_pct: Decimal,
}

/// Terminal state of the open-position workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPositionOutcome {
    /// Both the balancing swap and the deposit confirmed.
    Positioned {
        swap_signature: String,
        open_signature: String,
        tick_lower: i32,
        tick_upper: i32,
    },
    /// The balancing swap confirmed but the deposit did not. Half the budget
    /// now sits in the counterpart token and no position exists.
    FailedPartial {
        swap_signature: String,
        reason: String,
    },
}

/// Snapshot of an open position against the current pool price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    pub pool_id: String,
    pub nft_mint: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub price_lower: Decimal,
    pub price_upper: Decimal,
    /// Whether the current pool price sits inside the position's band.
    pub in_range: bool,
}

impl<C, R, Q, T> Workflows<C, R, Q, T>
where
    C: ChainReader,
    R: PoolRegistry,
    Q: QuoteEngine,
    T: TransactionBuilder,
{
    async fn lookup_pool(&self, pool_id: &str) -> Result<PoolInfo> {
        self.registry
            .pool_by_id(pool_id)
            .await?
            .ok_or_else(|| WorkflowError::PoolNotFound(pool_id.to_string()).into())
    }

    /// Opens a position in a Concentrated pool from a SOL budget.
    ///
    /// Any failure before the balancing swap confirms surfaces as an error;
    /// once the swap has confirmed, failures are reported through
    /// [`OpenPositionOutcome::FailedPartial`] so the swap signature is never
    /// lost.
    pub async fn open_position(&self, params: OpenPositionParams) -> Result<OpenPositionOutcome> {
        let pool = self.lookup_pool(&params.pool_id).await?;
        ensure!(
            pool.pool_type == PoolType::Concentrated,
            "Pool {} is {}, expected Concentrated",
            pool.id,
            pool.pool_type
        );

        let total = to_lamports(params.sol_amount)?;
        let (swap_amount, deposit_amount) = split_half(total);
        info!(
            pool = %pool.id,
            total,
            swap_amount,
            deposit_amount,
            "Opening position"
        );

        let swap_signature = self
            .swap_clmm_in_pool(&pool, &pool.mint_a.address, swap_amount)
            .await?;

        match self.place_position(&pool, &params, deposit_amount).await {
            Ok((open_signature, tick_lower, tick_upper)) => Ok(OpenPositionOutcome::Positioned {
                swap_signature,
                open_signature,
                tick_lower,
                tick_upper,
            }),
            Err(err) => {
                warn!(
                    pool = %pool.id,
                    %swap_signature,
                    error = %err,
                    "Deposit failed after balancing swap confirmed"
                );
                Ok(OpenPositionOutcome::FailedPartial {
                    swap_signature,
                    reason: format!("{err:#}"),
                })
            }
        }
    }

    async fn place_position(
        &self,
        pool: &PoolInfo,
        params: &OpenPositionParams,
        deposit_amount: u64,
    ) -> Result<(String, i32, i32)> {
        let (price_lower, price_upper) = band_around(pool.price, params.depth_pct)?;
        let tick_spacing = pool
            .tick_spacing
            .with_context(|| format!("Pool {} has no tick spacing", pool.id))?;

        let tick_a = price_to_initializable_tick(
            price_lower,
            pool.mint_a.decimals,
            pool.mint_b.decimals,
            tick_spacing,
        )
        .map_err(anyhow::Error::msg)?;
        let tick_b = price_to_initializable_tick(
            price_upper,
            pool.mint_a.decimals,
            pool.mint_b.decimals,
            tick_spacing,
        )
        .map_err(anyhow::Error::msg)?;
        let (tick_lower, tick_upper) = ordered_ticks(tick_a, tick_b);
        ensure!(
            tick_lower < tick_upper,
            "Price band collapsed to a single tick; widen the depth"
        );

        let counterpart = self
            .quotes
            .liquidity_from_base(pool, tick_lower, tick_upper, deposit_amount)
            .await?;
        // Pad the counterpart cap by the slippage tolerance so the deposit
        // survives small price moves between quoting and confirmation.
        let other_amount_max = ((counterpart as f64) * (1.0 + self.slippage)).ceil() as u64;

        let open_signature = self
            .executor
            .open_position(pool, tick_lower, tick_upper, deposit_amount, other_amount_max)
            .await?;
        info!(
            pool = %pool.id,
            tick_lower,
            tick_upper,
            %open_signature,
            "Position opened"
        );
        Ok((open_signature, tick_lower, tick_upper))
    }

    /// Closes the owner's position in the given pool.
    pub async fn close_position(&self, pool_id: &str) -> Result<String> {
        let pool = self.lookup_pool(pool_id).await?;
        let positions = self.executor.owner_positions(&pool.program_id).await?;
        let position = find_position_for_pool(&positions, &pool.id)?;

        let signature = self.executor.close_position(&pool, position).await?;
        info!(pool = %pool.id, nft_mint = %position.nft_mint, %signature, "Position closed");
        Ok(signature)
    }

    /// Reports the owner's position in the given pool against the current
    /// pool price.
    pub async fn check_position(&self, pool_id: &str) -> Result<PositionReport> {
        let pool = self.lookup_pool(pool_id).await?;
        let positions = self.executor.owner_positions(&pool.program_id).await?;
        let position = find_position_for_pool(&positions, &pool.id)?;

        let price_lower = tick_to_price(
            position.tick_lower,
            pool.mint_a.decimals,
            pool.mint_b.decimals,
        )
        .map_err(anyhow::Error::msg)?;
        let price_upper = tick_to_price(
            position.tick_upper,
            pool.mint_a.decimals,
            pool.mint_b.decimals,
        )
        .map_err(anyhow::Error::msg)?;

        Ok(PositionReport {
            pool_id: pool.id,
            nft_mint: position.nft_mint.clone(),
            tick_lower: position.tick_lower,
            tick_upper: position.tick_upper,
            liquidity: position.liquidity,
            price_lower,
            price_upper,
            in_range: pool.price >= price_lower && pool.price <= price_upper,
        })
    }

    /// Inspects the position and logs whether it needs attention.
    pub async fn manage(&self, pool_id: &str) -> Result<PositionReport> {
        let report = self.check_position(pool_id).await?;
        if report.in_range {
            info!(pool = %report.pool_id, "Position in range, nothing to do");
        } else {
            // TODO: close and reopen out-of-range positions around the
            // current price.
            warn!(
                pool = %report.pool_id,
                tick_lower = report.tick_lower,
                tick_upper = report.tick_upper,
                "Position out of range"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Workflows;
    use crate::mocks::*;
    use raylp_domain::entities::ClmmPosition;
    use rust_decimal_macros::dec;

    fn workflows(
        pools: Vec<PoolInfo>,
        executor: MockExecutor,
    ) -> Workflows<MockChain, MockRegistry, MockQuotes, MockExecutor> {
        Workflows::new(
            MockChain { decimals: 9 },
            MockRegistry { pools },
            MockQuotes::default(),
            executor,
        )
    }

    fn params() -> OpenPositionParams {
        OpenPositionParams {
            pool_id: "clmm-pool".to_string(),
            sol_amount: dec!(0.1),
            depth_pct: dec!(10),
        }
    }

    fn expected_ticks(pool: &PoolInfo, depth: Decimal) -> (i32, i32) {
        let (lower, upper) = band_around(pool.price, depth).unwrap();
        let spacing = pool.tick_spacing.unwrap();
        let a = price_to_initializable_tick(lower, 9, 6, spacing).unwrap();
        let b = price_to_initializable_tick(upper, 9, 6, spacing).unwrap();
        ordered_ticks(a, b)
    }

    #[tokio::test]
    async fn test_open_position_swaps_half_then_deposits() {
        let wf = workflows(vec![concentrated_pool()], MockExecutor::default());
        let outcome = wf.open_position(params()).await.unwrap();

        let (tick_lower, tick_upper) = expected_ticks(&concentrated_pool(), dec!(10));
        assert_eq!(
            outcome,
            OpenPositionOutcome::Positioned {
                swap_signature: "clmm-signature".to_string(),
                open_signature: "open-signature".to_string(),
                tick_lower,
                tick_upper,
            }
        );

        // 0.1 SOL splits into 50_000_000 lamports each way; the counterpart
        // cap is the quote padded by the 1% slippage tolerance.
        assert_eq!(
            wf.executor.recorded(),
            vec![
                format!("swap_clmm:clmm-pool:{SOL_MINT}:50000000:148500"),
                format!(
                    "open_position:clmm-pool:{tick_lower}:{tick_upper}:50000000:75750000"
                ),
            ]
        );
    }

    #[test]
    fn test_open_position_band_straddles_current_price() {
        let pool = concentrated_pool();
        let (tick_lower, tick_upper) = expected_ticks(&pool, dec!(10));
        let current = raylp_domain::math::price_tick::price_to_tick(pool.price, 9, 6).unwrap();
        assert!(tick_lower < current && current < tick_upper);
    }

    #[tokio::test]
    async fn test_open_position_reports_partial_failure() {
        let executor = MockExecutor {
            fail_open: true,
            ..MockExecutor::default()
        };
        let wf = workflows(vec![concentrated_pool()], executor);

        let outcome = wf.open_position(params()).await.unwrap();
        let OpenPositionOutcome::FailedPartial {
            swap_signature,
            reason,
        } = outcome
        else {
            panic!("expected FailedPartial, got {outcome:?}");
        };
        assert_eq!(swap_signature, "clmm-signature");
        assert!(reason.contains("simulated open failure"));
    }

    #[tokio::test]
    async fn test_open_position_unknown_pool_fails_before_swapping() {
        let wf = workflows(vec![], MockExecutor::default());
        let err = wf.open_position(params()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::PoolNotFound("clmm-pool".to_string()))
        );
        assert!(wf.executor.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_open_position_rejects_standard_pool() {
        let wf = workflows(vec![standard_pool()], MockExecutor::default());
        let err = wf
            .open_position(OpenPositionParams {
                pool_id: "amm-pool".to_string(),
                ..params()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected Concentrated"));
        assert!(wf.executor.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_close_position_finds_position_by_pool() {
        let executor = MockExecutor {
            positions: vec![
                ClmmPosition {
                    nft_mint: "other-nft".to_string(),
                    pool_id: "other-pool".to_string(),
                    tick_lower: -100,
                    tick_upper: 100,
                    liquidity: 1,
                },
                ClmmPosition {
                    nft_mint: "target-nft".to_string(),
                    pool_id: "clmm-pool".to_string(),
                    tick_lower: -20030,
                    tick_upper: -18020,
                    liquidity: 42,
                },
            ],
            ..MockExecutor::default()
        };
        let wf = workflows(vec![concentrated_pool()], executor);

        let signature = wf.close_position("clmm-pool").await.unwrap();
        assert_eq!(signature, "close-signature");
        assert_eq!(
            wf.executor.recorded(),
            vec!["close_position:clmm-pool:target-nft".to_string()]
        );
    }

    #[tokio::test]
    async fn test_close_position_without_holdings() {
        let wf = workflows(vec![concentrated_pool()], MockExecutor::default());
        let err = wf.close_position("clmm-pool").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::NoPositions)
        );
    }

    #[tokio::test]
    async fn test_check_position_reports_range() {
        // Band derived from the pool price itself, so the position is in
        // range by construction.
        let (tick_lower, tick_upper) = expected_ticks(&concentrated_pool(), dec!(10));
        let executor = MockExecutor {
            positions: vec![ClmmPosition {
                nft_mint: "nft".to_string(),
                pool_id: "clmm-pool".to_string(),
                tick_lower,
                tick_upper,
                liquidity: 42,
            }],
            ..MockExecutor::default()
        };
        let wf = workflows(vec![concentrated_pool()], executor);

        let report = wf.check_position("clmm-pool").await.unwrap();
        assert!(report.in_range);
        assert!(report.price_lower < dec!(150) && dec!(150) < report.price_upper);
        assert_eq!(report.liquidity, 42);
    }

    #[tokio::test]
    async fn test_check_position_out_of_range() {
        let executor = MockExecutor {
            positions: vec![ClmmPosition {
                nft_mint: "nft".to_string(),
                pool_id: "clmm-pool".to_string(),
                // Band far below the current price.
                tick_lower: -30000,
                tick_upper: -25000,
                liquidity: 42,
            }],
            ..MockExecutor::default()
        };
        let wf = workflows(vec![concentrated_pool()], executor);

        let report = wf.check_position("clmm-pool").await.unwrap();
        assert!(!report.in_range);
    }

    #[tokio::test]
    async fn test_check_position_unknown_pool() {
        let wf = workflows(vec![concentrated_pool()], MockExecutor::default());
        let err = wf.check_position("missing-pool").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<WorkflowError>(),
            Some(&WorkflowError::PoolNotFound("missing-pool".to_string()))
        );
    }
}
