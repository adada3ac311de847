use serde::{Deserialize, Serialize};

/// On-chain mint descriptor. Fetched fresh per call, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInfo {
    pub address: String,
    pub decimals: u8,
}

impl MintInfo {
    pub fn new(address: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            decimals,
        }
    }
}
