//! # Service Layer
//!
//! The operations the host framework calls. Services compose
//! repositories with the pure rules from itemforge-core; they hold no
//! state beyond the connection pool.

pub mod code;
pub mod invoice;
