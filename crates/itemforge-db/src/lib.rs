//! # itemforge-db: Database Layer for ItemForge
//!
//! This crate provides database access for ItemForge. It uses SQLite for
//! storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ItemForge Data Flow                            │
//! │                                                                     │
//! │  Host hook / remote procedure (reserve_next_code, submit, ...)      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  itemforge-db (THIS CRATE)                    │ │
//! │  │                                                               │ │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌───────────────────────┐ │ │
//! │  │  │  Database  │  │ Repositories │  │       Services        │ │ │
//! │  │  │ (pool.rs)  │  │ item_group   │  │  CodeService          │ │ │
//! │  │  │            │◄─│ series, item │◄─│  InvoiceService       │ │ │
//! │  │  │ SqlitePool │  │ mapping ...  │  │                       │ │ │
//! │  │  └────────────┘  └──────────────┘  └───────────────────────┘ │ │
//! │  │                                                               │ │
//! │  │  Migrations embedded from migrations/sqlite/                  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, busy-timeout, foreign keys)             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`service`] - Code reservation and invoice customization services
//!
//! ## Usage
//!
//! ```rust,ignore
//! use itemforge_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/itemforge.db")).await?;
//!
//! // Reserve the next code for a category
//! let code = db.codes().reserve_next_code("Sutures", 3, 3).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::batch::BatchRepository;
pub use repository::item::ItemRepository;
pub use repository::item_group::ItemGroupRepository;
pub use repository::mapping::MappingRepository;
pub use repository::sales::SalesRepository;
pub use repository::series::SeriesRepository;

// Service re-exports
pub use service::code::CodeService;
pub use service::invoice::InvoiceService;
