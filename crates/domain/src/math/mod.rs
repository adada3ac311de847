/// Constant-product (x * y = k) swap output.
pub mod constant_product;
/// Liquidity/amount relations for concentrated ranges.
pub mod liquidity;
/// Price to tick conversion.
pub mod price_tick;
