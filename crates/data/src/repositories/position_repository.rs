//! Position repository backed by PostgreSQL.

use super::PositionStore;
use crate::error::StoreError;
use crate::records::{PositionKey, PositionRecord};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

impl PositionRecord {
    /// Creates a PositionRecord from a database row.
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chain: row.try_get("chain")?,
            protocol: row.try_get("protocol")?,
            pool: row.try_get("pool")?,
            address: row.try_get("address")?,
            strategy: row.try_get("strategy")?,
            last_collected_at: row.try_get("last_collected_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Repository for position records.
#[derive(Clone)]
pub struct PgPositionRepository {
    pool: Arc<PgPool>,
}

impl PgPositionRepository {
    /// Creates a new PgPositionRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Finds a record by its ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PositionRecord>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM positions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(PositionRecord::from_row).transpose()
    }

    /// Finds all records, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn find_all(&self) -> Result<Vec<PositionRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM positions ORDER BY created_at")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(PositionRecord::from_row).collect()
    }
}

#[async_trait]
impl PositionStore for PgPositionRepository {
    async fn find_or_create(&self, key: &PositionKey) -> Result<PositionRecord, StoreError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO positions (id, chain, protocol, pool)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (chain, protocol, pool) DO UPDATE SET
                updated_at = positions.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&key.chain)
        .bind(&key.protocol)
        .bind(&key.pool)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(PositionRecord::from_row(&row)?)
    }

    async fn save(&self, record: &PositionRecord) -> Result<(), StoreError> {
        debug!(id = %record.id, pool = %record.pool, address = ?record.address, "Saving position record");
        let result = sqlx::query(
            r#"
            UPDATE positions SET
                address = $2,
                strategy = $3,
                last_collected_at = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.address)
        .bind(&record.strategy)
        .bind(record.last_collected_at)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.id));
        }
        Ok(())
    }
}
