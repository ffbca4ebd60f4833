//! # Item Group Repository
//!
//! Database operations for the hierarchical item category tree, including
//! the bounded ancestry walk the prefix composer consumes.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use itemforge_core::{ItemGroup, ROOT_ITEM_GROUP};

/// Repository for item group database operations.
#[derive(Debug, Clone)]
pub struct ItemGroupRepository {
    pool: SqlitePool,
}

impl ItemGroupRepository {
    /// Creates a new ItemGroupRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemGroupRepository { pool }
    }

    /// Gets a group by name.
    pub async fn get(&self, name: &str) -> DbResult<Option<ItemGroup>> {
        let group = sqlx::query_as::<_, ItemGroup>(
            r#"
            SELECT name, parent, code_prefix, created_at, updated_at
            FROM item_groups
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    /// Inserts a new group.
    pub async fn insert(&self, group: &ItemGroup) -> DbResult<()> {
        debug!(name = %group.name, "Inserting item group");

        sqlx::query(
            r#"
            INSERT INTO item_groups (name, parent, code_prefix, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&group.name)
        .bind(&group.parent)
        .bind(&group.code_prefix)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a group's explicit prefix override.
    pub async fn set_code_prefix(&self, name: &str, code_prefix: Option<&str>) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE item_groups SET code_prefix = ?2, updated_at = ?3
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .bind(code_prefix)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Walks the ancestry chain of a group, leaf first.
    ///
    /// ## Walk Rules
    /// - Visits at most `max_levels` groups (also bounds a malformed
    ///   cyclic tree)
    /// - Stops when a parent is missing, blank, or the root sentinel
    /// - A parent reference that resolves to no row truncates the walk
    ///   instead of failing
    ///
    /// ## Returns
    /// The visited groups, starting from `name` itself. Unknown starting
    /// names yield an empty chain.
    pub async fn ancestry(&self, name: &str, max_levels: usize) -> DbResult<Vec<ItemGroup>> {
        let mut chain: Vec<ItemGroup> = Vec::new();
        let mut current = Some(name.to_string());

        while let Some(cur) = current.take() {
            if chain.len() >= max_levels {
                break;
            }

            let Some(group) = self.get(&cur).await? else {
                // broken reference: truncate, don't fail
                debug!(group = %cur, "Ancestry walk truncated at unresolved group");
                break;
            };

            current = match group.parent.as_deref().map(str::trim) {
                Some(parent) if !parent.is_empty() && parent != ROOT_ITEM_GROUP => {
                    Some(parent.to_string())
                }
                _ => None,
            };

            chain.push(group);
        }

        Ok(chain)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
