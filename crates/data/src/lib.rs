//! Persistence of automated position records.
//!
//! A [`PositionRecord`] remembers, per configured pool, the address of the
//! live on-chain position and the strategy that opened it. Records are
//! stored in PostgreSQL through [`PgPositionRepository`] or kept in memory
//! with [`InMemoryPositionStore`].

/// Store errors.
pub mod error;
/// Persisted records.
pub mod records;
/// Store implementations.
pub mod repositories;

pub use error::StoreError;
pub use records::{PositionKey, PositionRecord, SOLANA};
pub use repositories::{Database, InMemoryPositionStore, PgPositionRepository, PositionStore};
