use crate::entities::token::MintInfo;
use crate::enums::PoolType;
use crate::errors::WorkflowError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A Raydium pool for a trading pair, as returned by the pool registry.
///
/// Fetched fresh per operation and never mutated locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Pool account address.
    pub id: String,
    /// Owning program (AMM v4 or CLMM).
    pub program_id: String,
    pub pool_type: PoolType,
    pub mint_a: MintInfo,
    pub mint_b: MintInfo,
    /// Current price of mint A denominated in mint B.
    pub price: Decimal,
    /// Trade fee in basis points.
    pub fee_bps: u32,
    /// CLMM only.
    pub tick_spacing: Option<u16>,
}

impl PoolInfo {
    /// Orders the pool's mints as (input, output) for a swap out of
    /// `input_mint`.
    ///
    /// Quoting and instruction building must agree on direction; both sides
    /// go through this single orientation point.
    pub fn orient(&self, input_mint: &str) -> Result<(&MintInfo, &MintInfo), WorkflowError> {
        if self.mint_a.address == input_mint {
            Ok((&self.mint_a, &self.mint_b))
        } else if self.mint_b.address == input_mint {
            Ok((&self.mint_b, &self.mint_a))
        } else {
            Err(WorkflowError::MintNotInPool(
                input_mint.to_string(),
                self.id.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool() -> PoolInfo {
        PoolInfo {
            id: "pool".to_string(),
            program_id: "program".to_string(),
            pool_type: PoolType::Concentrated,
            mint_a: MintInfo::new("mint-a", 9),
            mint_b: MintInfo::new("mint-b", 6),
            price: dec!(150),
            fee_bps: 25,
            tick_spacing: Some(10),
        }
    }

    #[test]
    fn test_orient_forward() {
        let pool = pool();
        let (input, output) = pool.orient("mint-a").unwrap();
        assert_eq!(input.address, "mint-a");
        assert_eq!(output.address, "mint-b");
    }

    #[test]
    fn test_orient_reverse() {
        let pool = pool();
        let (input, output) = pool.orient("mint-b").unwrap();
        assert_eq!(input.address, "mint-b");
        assert_eq!(output.address, "mint-a");
    }

    #[test]
    fn test_orient_rejects_foreign_mint() {
        let err = pool().orient("mint-c").unwrap_err();
        assert_eq!(
            err,
            WorkflowError::MintNotInPool("mint-c".to_string(), "pool".to_string())
        );
    }
}
