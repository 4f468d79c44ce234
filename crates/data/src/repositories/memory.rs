//! In-process position store.

use super::PositionStore;
use crate::error::StoreError;
use crate::records::{PositionKey, PositionRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Position records held in memory; lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    records: RwLock<HashMap<PositionKey, PositionRecord>>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, replacing any record with the same key.
    pub async fn insert(&self, record: PositionRecord) {
        self.records.write().await.insert(record.key(), record);
    }

    pub async fn get(&self, key: &PositionKey) -> Option<PositionRecord> {
        self.records.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PositionStore for InMemoryPositionStore {
    async fn find_or_create(&self, key: &PositionKey) -> Result<PositionRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(key.clone())
            .or_insert_with(|| PositionRecord::new(key, Utc::now()));
        Ok(record.clone())
    }

    async fn save(&self, record: &PositionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.key()) {
            Some(stored) if stored.id == record.id => {
                *stored = record.clone();
                stored.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(StoreError::NotFound(record.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_autopilot_domain::enums::Protocol;

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = InMemoryPositionStore::new();
        let key = PositionKey::new(Protocol::Whirlpool, "pool");

        let first = store.find_or_create(&key).await.unwrap();
        let second = store.find_or_create(&key).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_persists_address() {
        let store = InMemoryPositionStore::new();
        let key = PositionKey::new(Protocol::Whirlpool, "pool");
        let mut record = store.find_or_create(&key).await.unwrap();

        record.attach("position", "lower-biased", Utc::now());
        store.save(&record).await.unwrap();
        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.address.as_deref(), Some("position"));

        record.clear_position();
        store.save(&record).await.unwrap();
        assert_eq!(store.find_or_create(&key).await.unwrap().address, None);
    }

    #[tokio::test]
    async fn test_save_unknown_record_fails() {
        let store = InMemoryPositionStore::new();
        let record = PositionRecord::new(&PositionKey::new(Protocol::Whirlpool, "pool"), Utc::now());
        assert!(matches!(
            store.save(&record).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
