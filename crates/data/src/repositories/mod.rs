//! Repository implementations for position record persistence.

mod memory;
mod position_repository;

pub use memory::InMemoryPositionStore;
pub use position_repository::PgPositionRepository;

use crate::error::StoreError;
use crate::records::{PositionKey, PositionRecord};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Persistence of position records.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Record for `key`, created on first use.
    async fn find_or_create(&self, key: &PositionKey) -> Result<PositionRecord, StoreError>;

    /// Persists the mutable fields of an existing record.
    async fn save(&self, record: &PositionRecord) -> Result<(), StoreError>;
}

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates a PgPositionRepository instance.
    #[must_use]
    pub fn positions(&self) -> PgPositionRepository {
        PgPositionRepository::new(self.pool.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
