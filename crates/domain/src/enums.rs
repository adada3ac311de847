use serde::{Deserialize, Serialize};
use std::fmt;

/// Raydium pool flavor, using the strings the pool-info API reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolType {
    /// Constant-product AMM v4 pool.
    Standard,
    /// Concentrated-liquidity (CLMM) pool.
    Concentrated,
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::Concentrated => write!(f, "Concentrated"),
        }
    }
}
