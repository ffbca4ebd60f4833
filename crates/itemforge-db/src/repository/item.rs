//! # Item Repository
//!
//! Database operations for items: lookup, insertion, the guarded one-shot
//! code assignment, and the prefix scan behind the non-reserving preview.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use itemforge_core::{Item, CODE_SEPARATOR};

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets an item by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, item_code, name, description, item_group,
                   is_active, created_at, updated_at
            FROM items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Gets an item by its assigned code.
    pub async fn get_by_code(&self, item_code: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, item_code, name, description, item_group,
                   is_active, created_at, updated_at
            FROM items
            WHERE item_code = ?1
            "#,
        )
        .bind(item_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Inserts a new item.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - a non-NULL `item_code` collides
    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, item_code, name, description, item_group,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.item_code)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.item_group)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes a code onto an item only if it has none yet.
    ///
    /// The emptiness check lives in the WHERE clause, so of two
    /// concurrent assignments exactly one sticks; the loser sees `false`
    /// and should re-read the winning code.
    ///
    /// ## Returns
    /// `true` when this call applied the code.
    pub async fn set_code_if_absent(&self, id: &str, code: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE items SET item_code = ?2, updated_at = ?3
            WHERE id = ?1 AND (item_code IS NULL OR TRIM(item_code) = '')
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() > 0;
        debug!(id = %id, code = %code, applied = %applied, "Code assignment attempt");
        Ok(applied)
    }

    /// Collects code candidates for a prefix within one group.
    ///
    /// Scans both `item_code` and `name` (the identifying field migrated
    /// at some point, so legacy rows may only carry the code in `name`),
    /// preferring the code when both are present.
    pub async fn code_candidates(&self, item_group: &str, prefix: &str) -> DbResult<Vec<String>> {
        let like = format!("{prefix}{CODE_SEPARATOR}%");

        let rows: Vec<(Option<String>, String)> = sqlx::query_as(
            r#"
            SELECT item_code, name
            FROM items
            WHERE item_group = ?1 AND (item_code LIKE ?2 OR name LIKE ?2)
            "#,
        )
        .bind(item_group)
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, name)| match code.filter(|c| !c.trim().is_empty()) {
                Some(code) => code,
                None => name,
            })
            .collect())
    }

    /// Counts items in a group (for diagnostics).
    pub async fn count_in_group(&self, item_group: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE item_group = ?1 AND is_active = 1")
                .bind(item_group)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
