//! Position records.

use chrono::{DateTime, Utc};
use clmm_autopilot_domain::enums::Protocol;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chain every record currently lives on.
pub const SOLANA: &str = "solana";

/// Unique key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub chain: String,
    pub protocol: String,
    pub pool: String,
}

impl PositionKey {
    pub fn new(protocol: Protocol, pool: impl Into<String>) -> Self {
        Self {
            chain: SOLANA.to_string(),
            protocol: protocol.as_str().to_string(),
            pool: pool.into(),
        }
    }
}

/// Database record for an automated position.
///
/// `address` is `None` exactly when no live on-chain position exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Unique identifier.
    pub id: Uuid,
    pub chain: String,
    pub protocol: String,
    /// Pool address.
    pub pool: String,
    /// Position address while a position is open.
    pub address: Option<String>,
    /// Name of the strategy that opened the position.
    pub strategy: Option<String>,
    /// Last successful fee and reward harvest.
    pub last_collected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PositionRecord {
    /// A fresh record without a position.
    pub fn new(key: &PositionKey, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chain: key.chain.clone(),
            protocol: key.protocol.clone(),
            pool: key.pool.clone(),
            address: None,
            strategy: None,
            last_collected_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> PositionKey {
        PositionKey {
            chain: self.chain.clone(),
            protocol: self.protocol.clone(),
            pool: self.pool.clone(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.address.is_some()
    }

    /// Records a newly opened position.
    pub fn attach(&mut self, address: impl Into<String>, strategy: impl Into<String>, now: DateTime<Utc>) {
        self.address = Some(address.into());
        self.strategy = Some(strategy.into());
        self.last_collected_at = Some(now);
    }

    /// Forgets the position and the strategy that opened it.
    pub fn clear_position(&mut self) {
        self.address = None;
        self.strategy = None;
        self.last_collected_at = None;
    }

    pub fn mark_collected(&mut self, now: DateTime<Utc>) {
        self.last_collected_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_clear() {
        let now = Utc::now();
        let key = PositionKey::new(Protocol::Whirlpool, "pool");
        let mut record = PositionRecord::new(&key, now);
        assert!(!record.has_position());
        assert_eq!(record.chain, SOLANA);
        assert_eq!(record.protocol, "whirlpool");

        record.attach("position", "upper-biased", now);
        assert!(record.has_position());
        assert_eq!(record.strategy.as_deref(), Some("upper-biased"));
        assert_eq!(record.last_collected_at, Some(now));

        record.clear_position();
        assert_eq!(record.address, None);
        assert_eq!(record.strategy, None);
        assert_eq!(record.key(), key);
    }
}
