/// Unit conversion between human-readable amounts and base units.
pub mod amount;
/// Symmetric price bands around a pool price.
pub mod price_range;

pub use amount::{from_base_units, split_half, to_base_units, to_lamports};
pub use price_range::band_around;
