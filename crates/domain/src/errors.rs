use crate::enums::PoolType;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the orchestration workflows themselves.
///
/// Upstream RPC and API failures are not classified here; they propagate as
/// `anyhow::Error` with context attached at the call site, and the first
/// error aborts the operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// No pool of the requested type exists for the mint pair.
    #[error("no {0} pool found for mint pair")]
    NoPoolForPair(PoolType),

    /// The pool registry returned nothing for this id.
    #[error("no pool data found for {0}")]
    PoolNotFound(String),

    /// The mint is not one of the pool's trading pair.
    #[error("mint {0} is not traded by pool {1}")]
    MintNotInPool(String, String),

    /// The owner holds no positions under the pool's program.
    #[error("owner holds no positions")]
    NoPositions,

    /// The owner holds positions, but none in the target pool.
    #[error("no position found for pool {0}")]
    NoPositionForPool(String),

    /// A human-readable amount does not fit in base units.
    #[error("amount {0} does not fit in base units")]
    AmountOutOfRange(Decimal),

    /// A price that must be positive was not.
    #[error("price must be positive, got {0}")]
    InvalidPrice(Decimal),
}
