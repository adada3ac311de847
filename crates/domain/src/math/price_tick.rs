use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Returns the tick corresponding to a human-readable price of mint A in
/// terms of mint B.
///
/// The raw pool price scales the UI price by `10^(decimals_b - decimals_a)`;
/// tick = log_1.0001 of the raw price, rounded to the nearest tick.
pub fn price_to_tick(price: Decimal, decimals_a: u8, decimals_b: u8) -> Result<i32, &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    let price_f64 = price.to_f64().ok_or("Overflow converting price")?;
    let raw = price_f64 * 10f64.powi(i32::from(decimals_b) - i32::from(decimals_a));
    if raw <= 0.0 || !raw.is_finite() {
        return Err("Price out of range");
    }
    let tick = raw.log(1.0001f64);
    if !tick.is_finite() {
        return Err("Price out of range");
    }
    Ok(tick.round() as i32)
}

/// Returns the human-readable price corresponding to a tick.
/// P_raw = 1.0001 ^ tick, scaled back by mint decimals.
pub fn tick_to_price(tick: i32, decimals_a: u8, decimals_b: u8) -> Result<Decimal, &'static str> {
    let raw = 1.0001f64.powi(tick);
    let ui = raw * 10f64.powi(i32::from(decimals_a) - i32::from(decimals_b));
    Decimal::from_f64(ui).ok_or("Overflow converting price")
}

/// Rounds a tick to the nearest multiple of the pool's tick spacing.
/// Position bounds must sit on initializable ticks.
pub fn align_to_spacing(tick: i32, tick_spacing: u16) -> i32 {
    let spacing = i32::from(tick_spacing.max(1));
    let rem = tick.rem_euclid(spacing);
    if rem * 2 >= spacing {
        tick - rem + spacing
    } else {
        tick - rem
    }
}

/// `price_to_tick` followed by spacing alignment.
pub fn price_to_initializable_tick(
    price: Decimal,
    decimals_a: u8,
    decimals_b: u8,
    tick_spacing: u16,
) -> Result<i32, &'static str> {
    Ok(align_to_spacing(
        price_to_tick(price, decimals_a, decimals_b)?,
        tick_spacing,
    ))
}

/// Orders two ticks as (lower, upper). Tick conversion is not guaranteed to
/// preserve price ordering, so the bound derived from the lower price is
/// never assumed to be the numerically smaller tick.
pub fn ordered_ticks(a: i32, b: i32) -> (i32, i32) {
    (a.min(b), a.max(b))
}
