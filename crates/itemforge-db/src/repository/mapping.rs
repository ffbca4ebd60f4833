//! # Customer Mapping Repository
//!
//! Database operations for per-customer item name/description overrides.
//! Selection logic (customer > group > default, priority then recency)
//! lives in `itemforge_core::mapping`; this repository only fetches rows
//! and applies the pure resolution.

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use itemforge_core::mapping as mapping_rules;
use itemforge_core::{CustomerMapping, ResolvedMapping};

/// Repository for customer mapping operations.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    pool: SqlitePool,
}

impl MappingRepository {
    /// Creates a new MappingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MappingRepository { pool }
    }

    /// Inserts a mapping row.
    pub async fn insert(&self, mapping: &CustomerMapping) -> DbResult<()> {
        debug!(id = %mapping.id, item = %mapping.item_code, "Inserting customer mapping");

        sqlx::query(
            r#"
            INSERT INTO item_customer_mappings (
                id, item_code, customer, customer_group,
                customer_item_name, customer_description,
                priority, is_active, modified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&mapping.id)
        .bind(&mapping.item_code)
        .bind(&mapping.customer)
        .bind(&mapping.customer_group)
        .bind(&mapping.customer_item_name)
        .bind(&mapping.customer_description)
        .bind(mapping.priority)
        .bind(mapping.is_active)
        .bind(mapping.modified_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads every active mapping for a set of items.
    pub async fn active_for_items(&self, item_codes: &[String]) -> DbResult<Vec<CustomerMapping>> {
        if item_codes.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; item_codes.len()].join(", ");
        let sql = format!(
            "SELECT id, item_code, customer, customer_group, \
                    customer_item_name, customer_description, \
                    priority, is_active, modified_at \
             FROM item_customer_mappings \
             WHERE is_active = 1 AND item_code IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, CustomerMapping>(&sql);
        for code in item_codes {
            query = query.bind(code);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Lists active mappings for one item, best candidates first.
    pub async fn all_for_item(&self, item_code: &str) -> DbResult<Vec<CustomerMapping>> {
        let rows = sqlx::query_as::<_, CustomerMapping>(
            r#"
            SELECT id, item_code, customer, customer_group,
                   customer_item_name, customer_description,
                   priority, is_active, modified_at
            FROM item_customer_mappings
            WHERE item_code = ?1 AND is_active = 1
            ORDER BY COALESCE(priority, 999) ASC, modified_at DESC
            "#,
        )
        .bind(item_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Looks up the group a customer belongs to.
    pub async fn customer_group(&self, customer: &str) -> DbResult<Option<String>> {
        let group: Option<Option<String>> =
            sqlx::query_scalar("SELECT customer_group FROM customers WHERE name = ?1")
                .bind(customer)
                .fetch_optional(&self.pool)
                .await?;

        Ok(group.flatten())
    }

    /// Registers a customer (host fixture data).
    pub async fn insert_customer(&self, name: &str, customer_group: Option<&str>) -> DbResult<()> {
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO customers (name, customer_group, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(name)
        .bind(customer_group)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Resolves the applicable override per item for one customer.
    ///
    /// Items without any applicable mapping are absent from the result.
    pub async fn resolve_for_customer(
        &self,
        item_codes: &[String],
        customer: Option<&str>,
    ) -> DbResult<HashMap<String, ResolvedMapping>> {
        let rows = self.active_for_items(item_codes).await?;

        let customer_group = match customer {
            Some(c) => self.customer_group(c).await?,
            None => None,
        };

        let mut grouped: HashMap<String, Vec<CustomerMapping>> = HashMap::new();
        for row in rows {
            grouped.entry(row.item_code.clone()).or_default().push(row);
        }

        let mut resolved = HashMap::new();
        for code in item_codes {
            if let Some(item_rows) = grouped.get(code) {
                if let Some(choice) =
                    mapping_rules::resolve(item_rows, customer, customer_group.as_deref())
                {
                    resolved.insert(code.clone(), choice);
                }
            }
        }

        debug!(
            requested = item_codes.len(),
            resolved = resolved.len(),
            "Resolved customer mappings"
        );
        Ok(resolved)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
