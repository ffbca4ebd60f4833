//! # Validation Module
//!
//! Input validation for the code-generation operations. These run before
//! any counter is touched so a bad argument can never burn a reservation.

use crate::error::{ValidationError, ValidationResult};

/// Widest zero-pad the formatter will accept.
pub const MAX_CODE_DIGITS: usize = 9;

/// Deepest ancestry walk the composer will accept.
pub const MAX_PREFIX_LEVELS: usize = 10;

/// Validates the zero-pad width of the numeric suffix.
pub fn validate_digits(digits: usize) -> ValidationResult<()> {
    if digits == 0 || digits > MAX_CODE_DIGITS {
        return Err(ValidationError::OutOfRange {
            field: "digits".to_string(),
            min: 1,
            max: MAX_CODE_DIGITS as i64,
        });
    }
    Ok(())
}

/// Validates the ancestry depth bound.
pub fn validate_max_levels(max_levels: usize) -> ValidationResult<()> {
    if max_levels == 0 || max_levels > MAX_PREFIX_LEVELS {
        return Err(ValidationError::OutOfRange {
            field: "max_levels".to_string(),
            min: 1,
            max: MAX_PREFIX_LEVELS as i64,
        });
    }
    Ok(())
}

/// Validates an item group name argument.
pub fn validate_item_group_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item_group".to_string(),
        });
    }

    if name.len() > 140 {
        return Err(ValidationError::TooLong {
            field: "item_group".to_string(),
            max: 140,
        });
    }

    Ok(())
}

/// Validates a line quantity.
pub fn validate_qty(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() || qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
