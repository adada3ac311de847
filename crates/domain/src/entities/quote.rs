use serde::{Deserialize, Serialize};

/// A slippage-adjusted quote, consumed immediately to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Minimum acceptable output in base units.
    pub min_amount_out: u64,
    /// Accounts the swap instruction must reference in addition to the
    /// pool's own (tick arrays, for CLMM pools).
    pub remaining_accounts: Vec<String>,
}

/// Addresses of the initialized tick arrays around a CLMM pool's current
/// tick. Fetched before quoting and reused as the swap's remaining accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickArrayCache {
    pub pool_id: String,
    pub addresses: Vec<String>,
}
