//! Orca Whirlpool protocol adapter.
//!
//! This module provides functionality to interact with Orca Whirlpool pools:
//! - Decode pool and position accounts
//! - Build LP instructions
//! - Serve both through [`PoolClient`](crate::PoolClient)

/// Whirlpool-backed pool client.
pub mod client;
/// Instruction builders.
pub mod executor;
/// Orca whirlpool account structures.
pub mod whirlpool;

pub use client::WhirlpoolClient;
pub use executor::{WHIRLPOOL_PROGRAM_ID, WhirlpoolExecutor};
