//! # Series Repository
//!
//! The per-prefix monotonic counter behind generated item codes.
//!
//! ## Reservation Guarantee
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Series Reservation                               │
//! │                                                                     │
//! │  reserve_next("GENS-SUT")                                           │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │           ONE ATOMIC STATEMENT (autocommit)                   │ │
//! │  │                                                               │ │
//! │  │  INSERT INTO series (prefix, current) VALUES (?, 1)           │ │
//! │  │  ON CONFLICT(prefix) DO UPDATE SET current = current + 1      │ │
//! │  │  RETURNING current                                            │ │
//! │  │                                                               │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Durable on return. No read-then-write window exists, so two        │
//! │  concurrent callers can never observe the same value; the number    │
//! │  sequence per prefix is 1, 2, 3, ... with no gaps or repeats.       │
//! │                                                                     │
//! │  Failure (lock timeout, connectivity) → ReservationFailed with      │
//! │  the prefix; the row keeps its pre-call value and retrying the      │
//! │  whole operation is safe.                                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A number handed out but never applied to an item (caller crashed
//! after commit) is simply skipped - it is never reused.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for series counter operations.
#[derive(Debug, Clone)]
pub struct SeriesRepository {
    pool: SqlitePool,
}

impl SeriesRepository {
    /// Creates a new SeriesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SeriesRepository { pool }
    }

    /// Atomically reserves the next number for a prefix.
    ///
    /// First reservation for a prefix creates its row and returns 1;
    /// every later call increments in place and returns the new value.
    /// Counters for distinct prefixes share no state.
    ///
    /// ## Errors
    /// [`DbError::ReservationFailed`] naming the prefix when the
    /// statement cannot complete; no partial state is left behind.
    pub async fn reserve_next(&self, prefix: &str) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO series (prefix, current) VALUES (?1, 1)
            ON CONFLICT(prefix) DO UPDATE SET current = current + 1
            RETURNING current
            "#,
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::reservation_failed(prefix, e))?;

        debug!(prefix = %prefix, value = %value, "Reserved series number");
        Ok(value)
    }

    /// Reads the current counter value without reserving.
    ///
    /// `None` until the first reservation for the prefix. Diagnostic
    /// only; a caller must never treat this as a claim on the next
    /// number.
    pub async fn current(&self, prefix: &str) -> DbResult<Option<i64>> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT current FROM series WHERE prefix = ?1
            "#,
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
