//! # Prefix Composition
//!
//! Derives the textual prefix of a generated item code from a category
//! ancestry chain.
//!
//! ## How a Prefix Is Built
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Prefix Composition                              │
//! │                                                                     │
//! │  Ancestry chain (leaf first, fetched by itemforge-db):             │
//! │                                                                     │
//! │    "Sutures"           code_prefix = "SUT"   ──► "SUT"             │
//! │    "General Surgical"  no override           ──► abbr ──► "GENS"   │
//! │    (walk stopped at "All Item Groups")                              │
//! │                                                                     │
//! │  1. segment per group: sanitized override, else sanitized abbr     │
//! │  2. dedupe in first-encountered order                              │
//! │  3. reverse (root-most first) and join with '-'                    │
//! │                                                                     │
//! │  Result: "GENS-SUT"                                                 │
//! │                                                                     │
//! │  Empty chain / everything sanitized away ──► "ITEM"                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure: the same chain always composes the same
//! prefix. Walking the tree (and truncating on broken ancestry) is the
//! repository's job.

use crate::types::ItemGroup;
use crate::{CODE_SEPARATOR, DEFAULT_PREFIX_TOKEN, MAX_ABBR_LEN};

// =============================================================================
// Abbreviation
// =============================================================================

/// Derives an uppercase abbreviation from a display name.
///
/// ## Rules
/// - Everything but ASCII letters, digits, and whitespace is stripped
/// - Single-word names are truncated to `max_len`
/// - Multi-word names take the first 3 characters of the first word, then
///   greedily append leading characters of later words until `max_len`
///   is reached or words run out
///
/// ## Example
/// ```rust
/// use itemforge_core::prefix::abbreviate_name;
///
/// assert_eq!(abbreviate_name("General Surgical", 4), "GENS");
/// assert_eq!(abbreviate_name("Sutures", 4), "SUTU");
/// ```
pub fn abbreviate_name(name: &str, max_len: usize) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return DEFAULT_PREFIX_TOKEN.to_string();
    }

    if words.len() == 1 {
        return words[0].chars().take(max_len).collect();
    }

    let mut token: String = words[0].chars().take(3).collect();
    for word in &words[1..] {
        if token.len() >= max_len {
            break;
        }
        token.extend(word.chars().take(max_len - token.len()));
    }
    token
}

// =============================================================================
// Sanitization
// =============================================================================

/// Sanitizes one prefix segment into `[A-Z0-9-]` form.
///
/// Uppercases, turns whitespace runs into a single separator, drops every
/// other character, collapses repeated separators, and trims separators
/// from both ends. May return an empty string; callers fall back to
/// [`DEFAULT_PREFIX_TOKEN`] at the segment or whole-prefix level.
pub fn sanitize_segment(part: &str) -> String {
    let upper = part.trim().to_uppercase();

    let mut out = String::with_capacity(upper.len());
    let mut prev_sep = false;
    for c in upper.chars() {
        let mapped = if c.is_whitespace() || c == CODE_SEPARATOR {
            Some(CODE_SEPARATOR)
        } else if c.is_ascii_uppercase() || c.is_ascii_digit() {
            Some(c)
        } else {
            None
        };

        match mapped {
            Some(sep) if sep == CODE_SEPARATOR => {
                if !prev_sep {
                    out.push(sep);
                }
                prev_sep = true;
            }
            Some(ch) => {
                out.push(ch);
                prev_sep = false;
            }
            None => {}
        }
    }

    out.trim_matches(CODE_SEPARATOR).to_string()
}

// =============================================================================
// Composition
// =============================================================================

/// Composes a code prefix from a leaf-first ancestry chain.
///
/// ## Arguments
/// * `chain` - Ancestry groups, leaf first (as returned by the item-group
///   repository walk; already truncated at the root sentinel or a broken
///   reference)
/// * `max_levels` - Maximum number of chain entries considered
///
/// ## Returns
/// The joined prefix, root-most segment first. Falls back to
/// [`DEFAULT_PREFIX_TOKEN`] when nothing usable survives sanitization.
pub fn compose_prefix(chain: &[ItemGroup], max_levels: usize) -> String {
    let mut segments: Vec<String> = Vec::new();

    for group in chain.iter().take(max_levels) {
        let segment = match group.prefix_override() {
            Some(explicit) => sanitize_segment(explicit),
            None => sanitize_segment(&abbreviate_name(&group.name, MAX_ABBR_LEN)),
        };

        // Repeated segments are dropped, not re-added.
        if !segment.is_empty() && !segments.contains(&segment) {
            segments.push(segment);
        }
    }

    if segments.is_empty() {
        return DEFAULT_PREFIX_TOKEN.to_string();
    }

    segments.reverse();
    segments.join(&CODE_SEPARATOR.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn group(name: &str, parent: Option<&str>, code_prefix: Option<&str>) -> ItemGroup {
        let ts = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        ItemGroup {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            code_prefix: code_prefix.map(str::to_string),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_abbreviate_single_word() {
        assert_eq!(abbreviate_name("Sutures", 4), "SUTU");
        assert_eq!(abbreviate_name("Gel", 4), "GEL");
    }

    #[test]
    fn test_abbreviate_multi_word() {
        // first 3 of "GENERAL" + leading chars of "SURGICAL" up to len 4
        assert_eq!(abbreviate_name("General Surgical", 4), "GENS");
        assert_eq!(abbreviate_name("Ortho Implants Kit", 4), "ORTI");
    }

    #[test]
    fn test_abbreviate_strips_symbols() {
        assert_eq!(abbreviate_name("Gauze (Sterile)", 4), "GAUS");
        assert_eq!(abbreviate_name("---", 4), "ITEM");
        assert_eq!(abbreviate_name("", 4), "ITEM");
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("  Ortho   Implants "), "ORTHO-IMPLANTS");
        assert_eq!(sanitize_segment("sut"), "SUT");
        assert_eq!(sanitize_segment("A--B---C"), "A-B-C");
        assert_eq!(sanitize_segment("-LEAD-"), "LEAD");
        assert_eq!(sanitize_segment("@#$"), "");
    }

    #[test]
    fn test_compose_prefix_override_and_abbreviation() {
        // Root -> "General Surgical" (no override) -> "Sutures" (override SUT)
        let chain = vec![
            group("Sutures", Some("General Surgical"), Some("SUT")),
            group("General Surgical", Some("All Item Groups"), None),
        ];
        assert_eq!(compose_prefix(&chain, 3), "GENS-SUT");
    }

    #[test]
    fn test_compose_prefix_deduplicates() {
        let chain = vec![
            group("Sutures", Some("Mid"), Some("SUT")),
            group("Mid", Some("Top"), Some("SUT")),
            group("Top", None, Some("TOP")),
        ];
        assert_eq!(compose_prefix(&chain, 3), "TOP-SUT");
    }

    #[test]
    fn test_compose_prefix_respects_max_levels() {
        let chain = vec![
            group("Leaf", Some("Mid"), Some("LF")),
            group("Mid", Some("Top"), Some("MD")),
            group("Top", None, Some("TP")),
        ];
        assert_eq!(compose_prefix(&chain, 2), "MD-LF");
    }

    #[test]
    fn test_compose_prefix_empty_chain_falls_back() {
        assert_eq!(compose_prefix(&[], 3), "ITEM");
    }

    #[test]
    fn test_compose_prefix_unusable_segments_fall_back() {
        let chain = vec![group("@#$", None, Some("!!!"))];
        assert_eq!(compose_prefix(&chain, 3), "ITEM");
    }

    #[test]
    fn test_compose_prefix_is_deterministic() {
        let chain = vec![
            group("Sutures", Some("General Surgical"), Some("SUT")),
            group("General Surgical", Some("All Item Groups"), None),
        ];
        let first = compose_prefix(&chain, 3);
        let second = compose_prefix(&chain, 3);
        assert_eq!(first, second);
    }
}
