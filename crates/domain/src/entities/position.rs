use crate::errors::WorkflowError;
use serde::{Deserialize, Serialize};

/// An owner's position in a CLMM pool, parsed from the on-chain personal
/// position account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClmmPosition {
    /// Mint of the NFT representing the position.
    pub nft_mint: String,
    /// Pool the liquidity is deposited in.
    pub pool_id: String,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

/// Selects the owner's position in `pool_id` by linear scan.
///
/// The two failure modes are distinguishable: an owner with no positions at
/// all versus an owner with positions in other pools only.
pub fn find_position_for_pool<'a>(
    positions: &'a [ClmmPosition],
    pool_id: &str,
) -> Result<&'a ClmmPosition, WorkflowError> {
    if positions.is_empty() {
        return Err(WorkflowError::NoPositions);
    }
    positions
        .iter()
        .find(|p| p.pool_id == pool_id)
        .ok_or_else(|| WorkflowError::NoPositionForPool(pool_id.to_string()))
}
