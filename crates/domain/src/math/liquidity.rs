//! Liquidity/amount relations for a concentrated range.
//!
//! With sqrt prices s_l < s_c < s_u (raw token terms):
//!   L        = amount0 * (s_c * s_u) / (s_u - s_c)
//!   amount1  = L * (s_c - s_l)

/// Square root of the raw price at a tick: sqrt(1.0001 ^ tick).
pub fn sqrt_price_at_tick(tick: i32) -> f64 {
    1.0001f64.powi(tick).sqrt()
}

/// Counterpart token-1 amount required when depositing `amount0` of token 0
/// into the range `[tick_lower, tick_upper]` with the pool at
/// `tick_current`.
///
/// The current tick must sit strictly below the upper bound; a deposit
/// sized from the base side carries no token 0 once the price has crossed
/// the range.
pub fn counterpart_amount1(
    amount0: u64,
    tick_current: i32,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<u64, &'static str> {
    if tick_lower >= tick_upper {
        return Err("Empty tick range");
    }
    if tick_current >= tick_upper {
        return Err("Pool price above range");
    }

    let sqrt_lower = sqrt_price_at_tick(tick_lower);
    let sqrt_upper = sqrt_price_at_tick(tick_upper);
    // Below the range the deposit is all token 0 and needs no counterpart.
    let sqrt_current = sqrt_price_at_tick(tick_current).max(sqrt_lower);

    let liquidity = amount0 as f64 * (sqrt_current * sqrt_upper) / (sqrt_upper - sqrt_current);
    let amount1 = liquidity * (sqrt_current - sqrt_lower);
    if !amount1.is_finite() || amount1 < 0.0 {
        return Err("Overflow computing counterpart amount");
    }
    Ok(amount1.floor() as u64)
}
