//! Prelude module for convenient imports.

pub use crate::api::RaydiumApi;
pub use crate::raydium::executor::RaydiumExecutor;
pub use crate::raydium::quotes::RaydiumQuoteEngine;
pub use crate::rpc::{RpcConfig, RpcProvider};
pub use crate::session::{Session, SolanaChainReader};
pub use crate::{ChainReader, PoolRegistry, QuoteEngine, TransactionBuilder};
