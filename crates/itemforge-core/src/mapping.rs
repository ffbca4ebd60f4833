//! # Customer Mapping Selection
//!
//! Picks the item name/description override that applies to a customer.
//!
//! ## Selection Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Mapping Resolution (per item)                          │
//! │                                                                     │
//! │  active mapping rows for the item                                   │
//! │       │                                                             │
//! │       ├── rows for THIS customer         ──┐                        │
//! │       ├── rows for the customer's GROUP  ──┼── first non-empty      │
//! │       └── DEFAULT rows (no cust/group)   ──┘   bucket wins          │
//! │                                                                     │
//! │  within a bucket: lowest priority wins (unset = 999),               │
//! │  ties broken by most recent modified_at                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::types::{CustomerMapping, InvoiceLine, MappingSource, ResolvedMapping};
use crate::UNSET_MAPPING_PRIORITY;

/// Picks the best row out of one bucket.
///
/// Lowest priority wins; rows without a priority sort last; equal
/// priorities fall back to the most recently modified row.
pub fn choose<'a>(rows: &[&'a CustomerMapping]) -> Option<&'a CustomerMapping> {
    rows.iter()
        .min_by(|a, b| {
            let pa = a.priority.unwrap_or(UNSET_MAPPING_PRIORITY);
            let pb = b.priority.unwrap_or(UNSET_MAPPING_PRIORITY);
            pa.cmp(&pb).then(b.modified_at.cmp(&a.modified_at))
        })
        .copied()
}

/// Resolves the mapping for one item and one customer.
///
/// ## Arguments
/// * `rows` - Active mapping rows for the item
/// * `customer` - Customer on the document, if any
/// * `customer_group` - That customer's group, if known
///
/// ## Returns
/// The winning override plus which bucket it came from, or `None` when
/// no bucket has a row.
pub fn resolve(
    rows: &[CustomerMapping],
    customer: Option<&str>,
    customer_group: Option<&str>,
) -> Option<ResolvedMapping> {
    let customer_rows: Vec<&CustomerMapping> = rows
        .iter()
        .filter(|r| match (r.customer.as_deref(), customer) {
            (Some(rc), Some(c)) => rc == c,
            _ => false,
        })
        .collect();

    let group_rows: Vec<&CustomerMapping> = rows
        .iter()
        .filter(|r| match (r.customer_group.as_deref(), customer_group) {
            (Some(rg), Some(g)) => r.customer.is_none() && rg == g,
            _ => false,
        })
        .collect();

    let default_rows: Vec<&CustomerMapping> = rows
        .iter()
        .filter(|r| r.customer.is_none() && r.customer_group.is_none())
        .collect();

    let (chosen, source) = if let Some(c) = choose(&customer_rows) {
        (c, MappingSource::Customer)
    } else if let Some(g) = choose(&group_rows) {
        (g, MappingSource::Group)
    } else if let Some(d) = choose(&default_rows) {
        (d, MappingSource::Default)
    } else {
        return None;
    };

    Some(ResolvedMapping {
        mapping_id: chosen.id.clone(),
        item_name: chosen
            .customer_item_name
            .clone()
            .filter(|n| !n.is_empty()),
        description: chosen
            .customer_description
            .clone()
            .filter(|d| !d.is_empty()),
        source,
    })
}

/// Applies a resolved mapping onto an invoice line in place.
///
/// Only fields the mapping actually provides are overwritten; a mapping
/// with no description leaves the line's description alone.
pub fn apply_to_line(line: &mut InvoiceLine, resolved: &ResolvedMapping) {
    if let Some(name) = &resolved.item_name {
        line.item_name = Some(name.clone());
    }
    if let Some(description) = &resolved.description {
        line.description = Some(description.clone());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn mapping(
        id: &str,
        customer: Option<&str>,
        group: Option<&str>,
        priority: Option<i64>,
        day: u32,
    ) -> CustomerMapping {
        CustomerMapping {
            id: id.to_string(),
            item_code: "GENS-SUT-001".to_string(),
            customer: customer.map(str::to_string),
            customer_group: group.map(str::to_string),
            customer_item_name: Some(format!("name-{id}")),
            customer_description: Some(format!("desc-{id}")),
            priority,
            is_active: true,
            modified_at: ts(day),
        }
    }

    #[test]
    fn test_choose_lowest_priority_wins() {
        let a = mapping("a", None, None, Some(5), 1);
        let b = mapping("b", None, None, Some(1), 1);
        let rows = vec![&a, &b];
        assert_eq!(choose(&rows).unwrap().id, "b");
    }

    #[test]
    fn test_choose_unset_priority_sorts_last() {
        let a = mapping("a", None, None, None, 10);
        let b = mapping("b", None, None, Some(7), 1);
        let rows = vec![&a, &b];
        assert_eq!(choose(&rows).unwrap().id, "b");
    }

    #[test]
    fn test_choose_recency_breaks_priority_ties() {
        let older = mapping("older", None, None, Some(1), 1);
        let newer = mapping("newer", None, None, Some(1), 20);
        let rows = vec![&older, &newer];
        assert_eq!(choose(&rows).unwrap().id, "newer");
    }

    #[test]
    fn test_resolve_customer_beats_group_and_default() {
        let rows = vec![
            mapping("default", None, None, Some(1), 1),
            mapping("grp", None, Some("Hospitals"), Some(1), 1),
            mapping("cust", Some("City Clinic"), None, Some(9), 1),
        ];
        let resolved = resolve(&rows, Some("City Clinic"), Some("Hospitals")).unwrap();
        assert_eq!(resolved.mapping_id, "cust");
        assert_eq!(resolved.source, MappingSource::Customer);
    }

    #[test]
    fn test_resolve_group_beats_default() {
        let rows = vec![
            mapping("default", None, None, Some(1), 1),
            mapping("grp", None, Some("Hospitals"), Some(9), 1),
        ];
        let resolved = resolve(&rows, Some("City Clinic"), Some("Hospitals")).unwrap();
        assert_eq!(resolved.mapping_id, "grp");
        assert_eq!(resolved.source, MappingSource::Group);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let rows = vec![mapping("default", None, None, None, 1)];
        let resolved = resolve(&rows, Some("Unknown"), None).unwrap();
        assert_eq!(resolved.source, MappingSource::Default);
    }

    #[test]
    fn test_resolve_no_rows() {
        assert!(resolve(&[], Some("City Clinic"), None).is_none());
    }

    #[test]
    fn test_resolved_mapping_serializes_source_as_snake_case() {
        let rows = vec![mapping("cust", Some("City Clinic"), None, Some(1), 1)];
        let resolved = resolve(&rows, Some("City Clinic"), None).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["source"], "customer");
    }

    #[test]
    fn test_apply_to_line_keeps_unmapped_fields() {
        let mut line = InvoiceLine {
            id: "l1".to_string(),
            invoice_id: "inv1".to_string(),
            item_code: "GENS-SUT-001".to_string(),
            item_name: Some("Catalog Name".to_string()),
            description: Some("Catalog description".to_string()),
            qty: 1.0,
            rate_cents: 100,
            amount_cents: 100,
            manual_amount_cents: None,
            batch_no: None,
            conversion_factor: None,
            stock_qty: None,
            created_at: ts(1),
        };

        let resolved = ResolvedMapping {
            mapping_id: "m1".to_string(),
            item_name: Some("Customer Name".to_string()),
            description: None,
            source: MappingSource::Customer,
        };

        apply_to_line(&mut line, &resolved);
        assert_eq!(line.item_name.as_deref(), Some("Customer Name"));
        assert_eq!(line.description.as_deref(), Some("Catalog description"));
    }
}
