/// Output amount for a given input in a constant product pool (x * y = k).
///
/// formula: dy = y * dx / (x + dx)
/// taking fee into account: dy = y * (dx * (1 - fee)) / (x + (dx * (1 - fee)))
pub fn amm_swap_output(
    amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_bps: u32,
) -> Result<u64, &'static str> {
    if amount_in == 0 {
        return Ok(0);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err("Reserves must be non-zero");
    }
    if fee_bps >= 10_000 {
        return Err("Fee must be below 100%");
    }

    let amount_in_with_fee = u128::from(amount_in)
        .checked_mul(u128::from(10_000 - fee_bps))
        .ok_or("Overflow")?;
    let numerator = amount_in_with_fee
        .checked_mul(u128::from(reserve_out))
        .ok_or("Overflow")?;
    let denominator = u128::from(reserve_in)
        .checked_mul(10_000)
        .ok_or("Overflow")?
        .checked_add(amount_in_with_fee)
        .ok_or("Overflow")?;

    let amount_out = numerator / denominator;
    u64::try_from(amount_out).map_err(|_| "Overflow")
}

/// Applies a slippage tolerance (fraction, e.g. 0.01) to a quoted output,
/// rounding down to the guaranteed minimum.
pub fn apply_slippage(amount_out: u64, slippage: f64) -> Result<u64, &'static str> {
    if !(0.0..1.0).contains(&slippage) {
        return Err("Slippage must be in [0, 1)");
    }
    let min = (amount_out as f64) * (1.0 - slippage);
    Ok(min.floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amm_swap_output() {
        // 1000 reserve_in, 1000 reserve_out, 10 input, 0.3% fee (30 bps)
        // amount_in_with_fee = 10 * 9970 = 99700 (scaled by 10000)
        // numerator = 99700 * 1000 = 99,700,000
        // denominator = 1000 * 10000 + 99700 = 10,099,700
        // out = 99,700,000 / 10,099,700 = 9.8715... -> 9
        let out = amm_swap_output(10, 1000, 1000, 30).unwrap();
        assert_eq!(out, 9);
    }

    #[test]
    fn test_zero_input_yields_zero() {
        assert_eq!(amm_swap_output(0, 1000, 1000, 30).unwrap(), 0);
    }

    #[test]
    fn test_empty_reserves_rejected() {
        assert!(amm_swap_output(10, 0, 1000, 30).is_err());
        assert!(amm_swap_output(10, 1000, 0, 30).is_err());
    }

    #[test]
    fn test_output_bounded_by_reserve() {
        // Even a huge input cannot drain more than the output reserve.
        let out = amm_swap_output(u64::MAX / 2, 1000, 2000, 25).unwrap();
        assert!(out < 2000);
    }

    #[test]
    fn test_apply_slippage() {
        assert_eq!(apply_slippage(1000, 0.01).unwrap(), 990);
        assert_eq!(apply_slippage(0, 0.01).unwrap(), 0);
        assert!(apply_slippage(1000, 1.0).is_err());
        assert!(apply_slippage(1000, -0.1).is_err());
    }
}
