//! # Domain Types
//!
//! Core domain types used throughout ItemForge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌─────────────────────┐   │
//! │  │   ItemGroup    │  │      Item      │  │    SeriesCounter    │   │
//! │  │  ────────────  │  │  ────────────  │  │  ─────────────────  │   │
//! │  │  name (PK)     │  │  id (UUID)     │  │  prefix (PK)        │   │
//! │  │  parent        │  │  item_code     │  │  current            │   │
//! │  │  code_prefix   │  │  item_group    │  └─────────────────────┘   │
//! │  └────────────────┘  └────────────────┘                            │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌─────────────────────┐   │
//! │  │CustomerMapping │  │     Batch      │  │ Invoice/InvoiceLine │   │
//! │  │  ────────────  │  │  ────────────  │  │  ─────────────────  │   │
//! │  │  customer      │  │  batch_size    │  │  status lifecycle   │   │
//! │  │  customer_group│  │  available_qty │  │  lines w/ amounts   │   │
//! │  │  priority      │  └────────────────┘  └─────────────────────┘   │
//! │  └────────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - Money fields are integer cents (`*_cents: i64`), never floats
//! - Quantities are `f64` (fractional stock units are legal)
//! - Persisted types derive `sqlx::FromRow` behind the `sqlx` feature

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Item Group (category)
// =============================================================================

/// A node in the hierarchical item category tree.
///
/// The tree is read-only to this system: the composer walks `parent`
/// references upward, it never mutates them. A `parent` of `None` or the
/// root sentinel marks the top of the tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ItemGroup {
    /// Group name - primary key and display name at once.
    pub name: String,

    /// Parent group name; `None` or `ROOT_ITEM_GROUP` at the root.
    pub parent: Option<String>,

    /// Explicit prefix override. When set (non-empty), the composer uses
    /// it instead of abbreviating the name.
    pub code_prefix: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemGroup {
    /// Returns the trimmed explicit prefix override, if one is set.
    pub fn prefix_override(&self) -> Option<&str> {
        self.code_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

// =============================================================================
// Item
// =============================================================================

/// An item record.
///
/// `item_code` stays `None` until a code is reserved and applied; once
/// written it is never regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Generated business code (`PREFIX-NNN`), absent until assigned.
    pub item_code: Option<String>,

    /// Display name.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Category the item belongs to; drives prefix composition.
    pub item_group: Option<String>,

    /// Whether the item is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the assigned code if one is present and non-blank.
    pub fn assigned_code(&self) -> Option<&str> {
        self.item_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// =============================================================================
// Series Counter
// =============================================================================

/// A persisted per-prefix monotonic counter row.
///
/// Created on first reservation for its prefix, incremented in place on
/// every reservation after that, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SeriesCounter {
    pub prefix: String,
    pub current: i64,
}

// =============================================================================
// Customer & Mapping
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub name: String,
    pub customer_group: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A per-customer item name/description override row.
///
/// Exactly one of three shapes:
/// - `customer` set: applies to that customer only
/// - `customer_group` set: applies to every customer in the group
/// - neither set: the default fallback for the item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CustomerMapping {
    pub id: String,
    pub item_code: String,
    pub customer: Option<String>,
    pub customer_group: Option<String>,
    pub customer_item_name: Option<String>,
    pub customer_description: Option<String>,

    /// Lower wins; `None` sorts after every explicit priority.
    pub priority: Option<i64>,

    pub is_active: bool,

    /// Recency tie-break within equal priorities.
    pub modified_at: DateTime<Utc>,
}

/// Which bucket a resolved mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Customer,
    Group,
    Default,
}

/// Resolution result handed back to the host per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMapping {
    /// Id of the winning mapping row.
    pub mapping_id: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub source: MappingSource,
}

// =============================================================================
// Batch
// =============================================================================

/// A production batch with a nominal capacity and running availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Batch {
    pub name: String,
    pub item_code: Option<String>,

    /// Nominal capacity; `None` disables the capacity guard.
    pub batch_size: Option<f64>,

    /// Remaining quantity, delta-updated on invoice submit/cancel.
    pub available_qty: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Invoice
// =============================================================================

/// The status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being edited; batch availability not yet consumed.
    Draft,
    /// Finalized; stock-affecting invoices have consumed availability.
    Submitted,
    /// Reversed; consumed availability has been returned.
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    pub customer: String,
    pub posting_date: NaiveDate,

    /// Whether this document affects stock when submitted.
    pub update_stock: bool,

    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceLine {
    pub id: String,
    pub invoice_id: String,
    pub item_code: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub qty: f64,
    pub rate_cents: i64,
    pub amount_cents: i64,

    /// User-entered total; when positive it overrides `qty * rate`.
    pub manual_amount_cents: Option<i64>,

    pub batch_no: Option<String>,
    pub conversion_factor: Option<f64>,

    /// Quantity in stock units; derived from `qty * conversion_factor`
    /// when absent.
    pub stock_qty: Option<f64>,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Price History
// =============================================================================

/// One historical price observation for an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PricePoint {
    /// Invoice the price was observed on.
    pub invoice: String,
    pub posting_date: NaiveDate,
    pub rate_cents: i64,
    pub customer: String,
}
