//! # Code Service
//!
//! The three code operations exposed to the host framework.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        CodeService                                  │
//! │                                                                     │
//! │  reserve_next_code(group, digits, levels)                           │
//! │      compose prefix ──► reserve counter ──► format                  │
//! │      (consumes a number; durable once returned)                     │
//! │                                                                     │
//! │  preview_next_code(group, digits, levels)                           │
//! │      compose prefix ──► scan existing codes ──► max + 1             │
//! │      (no locking, no write; advisory only)                          │
//! │                                                                     │
//! │  assign_code_if_absent(item, group?, digits, levels)                │
//! │      existing code? ──► return it, consume NOTHING                  │
//! │      no group?      ──► MissingItemGroup, before any reservation    │
//! │      otherwise      ──► reserve + guarded one-shot write            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The idempotence of `assign_code_if_absent` is what keeps retried
//! remote calls from leaking reserved numbers onto no entity.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::item::ItemRepository;
use crate::repository::item_group::ItemGroupRepository;
use crate::repository::series::SeriesRepository;
use itemforge_core::{code, prefix, validation};

/// Service for item code generation.
#[derive(Debug, Clone)]
pub struct CodeService {
    groups: ItemGroupRepository,
    items: ItemRepository,
    series: SeriesRepository,
}

impl CodeService {
    /// Creates a new CodeService.
    pub fn new(pool: SqlitePool) -> Self {
        CodeService {
            groups: ItemGroupRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            series: SeriesRepository::new(pool),
        }
    }

    /// Composes the code prefix for a group from its ancestry.
    ///
    /// Unknown groups produce an empty chain and therefore the default
    /// prefix token; the composer itself never fails.
    pub async fn compose_prefix_for(&self, item_group: &str, max_levels: usize) -> DbResult<String> {
        let chain = self.groups.ancestry(item_group, max_levels).await?;
        Ok(prefix::compose_prefix(&chain, max_levels))
    }

    /// Reserves and formats the next code for a group.
    ///
    /// ## Arguments
    /// * `item_group` - Category whose ancestry drives the prefix
    /// * `digits` - Zero-pad width of the numeric suffix
    /// * `max_levels` - Ancestry depth bound for the prefix
    ///
    /// ## Returns
    /// The formatted code. The underlying number is consumed even if the
    /// caller discards the result (skipped numbers are never reused).
    pub async fn reserve_next_code(
        &self,
        item_group: &str,
        digits: usize,
        max_levels: usize,
    ) -> DbResult<String> {
        validation::validate_item_group_name(item_group)?;
        validation::validate_digits(digits)?;
        validation::validate_max_levels(max_levels)?;

        let prefix = self.compose_prefix_for(item_group, max_levels).await?;
        let number = self.series.reserve_next(&prefix).await?;

        let code = code::format_code(&prefix, number, digits);
        info!(prefix = %prefix, number = %number, "Reserved item code");
        Ok(code)
    }

    /// Previews the next code for a group without reserving anything.
    ///
    /// Scans existing items of the group whose code (or legacy name)
    /// starts with the composed prefix and formats max + 1. Purely
    /// advisory: it may race with concurrent reservations and its output
    /// must never be treated as reserved.
    pub async fn preview_next_code(
        &self,
        item_group: &str,
        digits: usize,
        max_levels: usize,
    ) -> DbResult<String> {
        validation::validate_item_group_name(item_group)?;
        validation::validate_digits(digits)?;
        validation::validate_max_levels(max_levels)?;

        let prefix = self.compose_prefix_for(item_group, max_levels).await?;
        let candidates = self.items.code_candidates(item_group, &prefix).await?;
        let next = code::next_code_number(&candidates);

        debug!(prefix = %prefix, candidates = candidates.len(), next = %next, "Previewed next code");
        Ok(code::format_code(&prefix, next, digits))
    }

    /// Assigns a code to an item unless it already has one.
    ///
    /// ## Idempotence
    /// An item that already carries a code gets it returned unchanged
    /// and **no reservation is consumed** - calling this twice (e.g. a
    /// retried remote call) burns exactly one number.
    ///
    /// ## Arguments
    /// * `item_id` - Item to stamp
    /// * `item_group` - Group override; falls back to the item's own
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such item
    /// * `DbError::MissingItemGroup` - neither argument nor item resolves
    ///   a group (raised before any reservation)
    /// * `DbError::ReservationFailed` - the counter could not be bumped
    pub async fn assign_code_if_absent(
        &self,
        item_id: &str,
        item_group: Option<&str>,
        digits: usize,
        max_levels: usize,
    ) -> DbResult<String> {
        let item = self
            .items
            .get_by_id(item_id)
            .await?
            .ok_or_else(|| DbError::not_found("Item", item_id))?;

        if let Some(existing) = item.assigned_code() {
            debug!(item = %item_id, code = %existing, "Item already coded; nothing reserved");
            return Ok(existing.to_string());
        }

        let group = item_group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .or_else(|| {
                item.item_group
                    .as_deref()
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| DbError::MissingItemGroup {
                item: item_id.to_string(),
            })?;

        let code = self.reserve_next_code(&group, digits, max_levels).await?;

        if self.items.set_code_if_absent(item_id, &code).await? {
            info!(item = %item_id, code = %code, "Assigned item code");
            return Ok(code);
        }

        // A concurrent assignment won the race; the number reserved here
        // is skipped. Surface whatever actually stuck.
        let winner = self
            .items
            .get_by_id(item_id)
            .await?
            .and_then(|i| i.assigned_code().map(str::to_string))
            .ok_or_else(|| DbError::not_found("Item", item_id))?;

        debug!(item = %item_id, code = %winner, "Lost assignment race; returning applied code");
        Ok(winner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
