//! # Code Formatting
//!
//! Formats generated codes (`PREFIX-NNN`) and extracts trailing numbers
//! from existing ones for the non-reserving preview.

use crate::CODE_SEPARATOR;

/// Formats a generated code from a prefix and a reserved number.
///
/// The number is zero-padded to `digits` width. A number that needs more
/// digits than `digits` simply renders longer; widths are a display
/// convention, not a hard limit.
///
/// ## Example
/// ```rust
/// use itemforge_core::code::format_code;
///
/// assert_eq!(format_code("SURG-ENT", 7, 3), "SURG-ENT-007");
/// assert_eq!(format_code("X", 1000, 3), "X-1000");
/// ```
pub fn format_code(prefix: &str, number: i64, digits: usize) -> String {
    format!("{prefix}{CODE_SEPARATOR}{number:0digits$}")
}

/// Extracts the trailing numeric segment of a code, if any.
///
/// The segment after the last separator must be entirely ASCII digits;
/// anything else yields `None`.
pub fn trailing_number(code: &str) -> Option<i64> {
    let last = code.rsplit(CODE_SEPARATOR).next()?;
    if last.is_empty() || !last.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    last.parse().ok()
}

/// Computes the next preview number from existing code candidates.
///
/// Takes the maximum trailing number across candidates and adds one;
/// with no numeric candidates the preview starts at 1. Candidates that
/// carry no trailing number are skipped.
pub fn next_code_number<I, S>(candidates: I) -> i64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter_map(|c| trailing_number(c.as_ref()))
        .max()
        .unwrap_or(0)
        + 1
}

// =============================================================================
// Unit Tests
// =============================================================================
