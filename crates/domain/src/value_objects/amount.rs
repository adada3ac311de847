use crate::errors::WorkflowError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Decimals of the native mint; one SOL is `10^9` lamports.
pub const SOL_DECIMALS: u8 = 9;

/// Converts a human-readable amount to base units: `amount * 10^decimals`,
/// truncated to an integer.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, WorkflowError> {
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(WorkflowError::AmountOutOfRange(amount))?;
    let raw = (amount * Decimal::from(scale)).trunc();
    raw.to_u64().ok_or(WorkflowError::AmountOutOfRange(amount))
}

/// Converts base units back to a human-readable amount.
pub fn from_base_units(raw: u64, decimals: u8) -> Decimal {
    Decimal::from(raw) / Decimal::from(10u64.pow(u32::from(decimals)))
}

/// Converts a SOL amount to lamports.
pub fn to_lamports(amount: Decimal) -> Result<u64, WorkflowError> {
    to_base_units(amount, SOL_DECIMALS)
}

/// Splits a lamport total into the half routed through the balancing swap
/// and the remainder kept for the deposit. The two parts always sum back to
/// `total`; the only loss is integer-division truncation inside the first
/// half.
pub fn split_half(total: u64) -> (u64, u64) {
    let swap = total / 2;
    (swap, total - swap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(0.001), 9).unwrap(), 1_000_000);
        assert_eq!(to_base_units(dec!(1), 6).unwrap(), 1_000_000);
        assert_eq!(to_base_units(dec!(0), 9).unwrap(), 0);
    }

    #[test]
    fn test_round_trip() {
        let amount = dec!(0.001);
        let raw = to_base_units(amount, 9).unwrap();
        assert_eq!(from_base_units(raw, 9), amount);
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(to_base_units(dec!(-1), 9).is_err());
    }

    #[test]
    fn test_to_lamports() {
        assert_eq!(to_lamports(dec!(1.5)).unwrap(), 1_500_000_000);
    }

    #[test]
    fn test_split_half_sums_to_total() {
        for total in [0u64, 1, 2, 999, 1_000_000_001] {
            let (swap, deposit) = split_half(total);
            assert_eq!(swap + deposit, total);
            assert!(swap <= deposit);
            assert!(deposit - swap <= 1);
        }
    }
}
