/// Pool descriptors.
pub mod pool;
/// Owner positions.
pub mod position;
/// Quotes and tick-array state.
pub mod quote;
/// Mint descriptors.
pub mod token;

pub use pool::PoolInfo;
pub use position::{ClmmPosition, find_position_for_pool};
pub use quote::{SwapQuote, TickArrayCache};
pub use token::MintInfo;
