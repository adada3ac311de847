//! Raydium protocol adapter.
//!
//! This module covers everything Raydium specific:
//! - Parsing CLMM pool and position accounts
//! - Tick-array and position PDA derivation
//! - Quoting from vault reserves and the swap-compute service
//! - Building and submitting swap/position transactions

/// Transaction building and submission.
pub mod executor;
/// Quote engine.
pub mod quotes;
/// On-chain account structures and PDA derivation.
pub mod state;
