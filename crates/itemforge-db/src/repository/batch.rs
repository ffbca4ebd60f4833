//! # Batch Repository
//!
//! Database operations for production batches: capacity lookups and the
//! delta-updated running availability.
//!
//! ## Delta Updates
//! Availability is adjusted relatively (`available_qty + delta`), never
//! written absolutely: submit and cancel from concurrent documents then
//! compose instead of clobbering each other.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use itemforge_core::Batch;

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
}

impl BatchRepository {
    /// Creates a new BatchRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BatchRepository { pool }
    }

    /// Gets a batch by name.
    pub async fn get(&self, name: &str) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(
            r#"
            SELECT name, item_code, batch_size, available_qty, created_at, updated_at
            FROM batches
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Inserts a new batch.
    pub async fn insert(&self, batch: &Batch) -> DbResult<()> {
        debug!(name = %batch.name, "Inserting batch");

        sqlx::query(
            r#"
            INSERT INTO batches (name, item_code, batch_size, available_qty, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&batch.name)
        .bind(&batch.item_code)
        .bind(batch.batch_size)
        .bind(batch.available_qty)
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Availability per batch for a set of names.
    ///
    /// Unknown batches are absent from the map; callers treat absent as
    /// zero available.
    pub async fn available_for(&self, names: &[String]) -> DbResult<HashMap<String, f64>> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "SELECT name, COALESCE(available_qty, 0) \
             FROM batches WHERE name IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, (String, f64)>(&sql);
        for name in names {
            query = query.bind(name);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    /// Applies a relative change to a batch's availability.
    ///
    /// Negative deltas consume (document submit), positive deltas return
    /// (document cancel).
    pub async fn adjust_available(&self, name: &str, delta: f64) -> DbResult<()> {
        debug!(name = %name, delta = %delta, "Adjusting batch availability");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE batches
            SET available_qty = COALESCE(available_qty, 0) + ?2,
                updated_at = ?3
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Batch", name));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
