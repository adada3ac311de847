//! Core domain types for the Raydium position manager.
//!
//! Everything in this crate is plain data and pure math: pool and position
//! descriptors, unit conversion, price bands and tick arithmetic. Network
//! access, account parsing and transaction building live in
//! `raylp-protocols`.

pub mod entities;
pub mod enums;
pub mod errors;
pub mod math;
pub mod value_objects;
