use crate::errors::WorkflowError;
use rust_decimal::Decimal;

/// Computes the symmetric price band around a pool price for a percentage
/// depth: `p * (100 - k) / 100` and `p * (100 + k) / 100`.
pub fn band_around(
    price: Decimal,
    depth_pct: Decimal,
) -> Result<(Decimal, Decimal), WorkflowError> {
    if price <= Decimal::ZERO {
        return Err(WorkflowError::InvalidPrice(price));
    }
    let hundred = Decimal::ONE_HUNDRED;
    let lower = price * (hundred - depth_pct) / hundred;
    let upper = price * (hundred + depth_pct) / hundred;
    if lower <= Decimal::ZERO {
        return Err(WorkflowError::InvalidPrice(lower));
    }
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_band_symmetry() {
        let (lower, upper) = band_around(dec!(150), dec!(10)).unwrap();
        assert_eq!(lower, dec!(135));
        assert_eq!(upper, dec!(165));
        // Bounds are equidistant from the center.
        assert_eq!(dec!(150) - lower, upper - dec!(150));
    }

    #[test]
    fn test_zero_depth_collapses_to_price() {
        let (lower, upper) = band_around(dec!(42), dec!(0)).unwrap();
        assert_eq!(lower, dec!(42));
        assert_eq!(upper, dec!(42));
    }

    #[test]
    fn test_nonpositive_price_rejected() {
        assert!(band_around(dec!(0), dec!(10)).is_err());
        assert!(band_around(dec!(-1), dec!(10)).is_err());
    }

    #[test]
    fn test_full_depth_rejected() {
        // depth >= 100 would push the lower bound to or below zero.
        assert!(band_around(dec!(100), dec!(100)).is_err());
    }
}
