//! # itemforge-core: Pure Business Logic for ItemForge
//!
//! This crate is the **heart** of ItemForge. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ItemForge Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  Host ERP application                         │ │
//! │  │   item form hooks ──► invoice hooks ──► remote procedures     │ │
//! │  └────────────────────────────┬──────────────────────────────────┘ │
//! │                               │                                     │
//! │  ┌────────────────────────────▼──────────────────────────────────┐ │
//! │  │             ★ itemforge-core (THIS CRATE) ★                   │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐ ┌────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │ │
//! │  │  │ prefix  │ │  code  │ │ mapping │ │ billing │ │validation│ │ │
//! │  │  │ compose │ │ format │ │ choose  │ │ amounts │ │  rules   │ │ │
//! │  │  └─────────┘ └────────┘ └─────────┘ └─────────┘ └──────────┘ │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └────────────────────────────┬──────────────────────────────────┘ │
//! │                               │                                     │
//! │  ┌────────────────────────────▼──────────────────────────────────┐ │
//! │  │                itemforge-db (Database Layer)                  │ │
//! │  │        SQLite queries, migrations, repositories, services     │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ItemGroup, Item, CustomerMapping, etc.)
//! - [`prefix`] - Category-derived code prefix composition
//! - [`code`] - Code formatting and trailing-number math
//! - [`mapping`] - Customer item-name override selection
//! - [`billing`] - Line amounts and batch quantity math
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod code;
pub mod error;
pub mod mapping;
pub mod prefix;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ValidationError, ValidationResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sentinel name of the category tree root.
///
/// The ancestry walk stops when it reaches a group whose parent is this
/// value (or is missing). The root itself never contributes a prefix
/// segment.
pub const ROOT_ITEM_GROUP: &str = "All Item Groups";

/// Fallback prefix token used when composition produces nothing
/// (empty ancestry, or every segment sanitized away).
pub const DEFAULT_PREFIX_TOKEN: &str = "ITEM";

/// Separator between prefix segments and before the numeric suffix.
pub const CODE_SEPARATOR: char = '-';

/// Maximum length of an abbreviation derived from a group name.
pub const MAX_ABBR_LEN: usize = 4;

/// Default zero-pad width for the numeric code suffix.
pub const DEFAULT_CODE_DIGITS: usize = 3;

/// Default number of ancestry levels contributing to a prefix.
pub const DEFAULT_MAX_PREFIX_LEVELS: usize = 3;

/// Priority assigned to mapping rows that carry none.
///
/// Lower priorities win; rows without an explicit priority sort last.
pub const UNSET_MAPPING_PRIORITY: i64 = 999;
