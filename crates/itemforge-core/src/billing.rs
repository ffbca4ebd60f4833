//! # Line Amounts & Batch Quantity Math
//!
//! Pure calculations for invoice lines: the manual-amount override, stock
//! quantity per line, per-batch aggregation, and the batch capacity guard.

use std::collections::HashMap;

use crate::types::InvoiceLine;

/// Tolerance for availability comparisons on fractional quantities.
pub const QTY_EPSILON: f64 = 1e-9;

// =============================================================================
// Line Amounts
// =============================================================================

/// Recalculates one line's rate and amount.
///
/// When a positive manual amount is present the rate is derived from it
/// (`rate = manual / qty`, rounded to the cent) and the amount is the
/// manual amount verbatim. Otherwise the usual `qty * rate` applies.
/// Lines with zero quantity are left untouched.
pub fn apply_line_amount(line: &mut InvoiceLine) {
    if line.qty <= 0.0 {
        return;
    }

    match line.manual_amount_cents {
        Some(manual) if manual > 0 => {
            line.rate_cents = (manual as f64 / line.qty).round() as i64;
            line.amount_cents = manual;
        }
        _ => {
            line.amount_cents = (line.qty * line.rate_cents as f64).round() as i64;
        }
    }
}

// =============================================================================
// Stock Quantities
// =============================================================================

/// Quantity of one line in stock units.
///
/// Uses `stock_qty` when the host provided it, falling back to
/// `qty * conversion_factor` (factor defaults to 1).
pub fn line_stock_qty(line: &InvoiceLine) -> f64 {
    match line.stock_qty {
        Some(sq) => sq,
        None => line.qty * line.conversion_factor.unwrap_or(1.0),
    }
}

/// Aggregates requested stock quantity per batch across a document.
///
/// Lines without a batch, or with a non-positive stock quantity, do not
/// contribute.
pub fn requested_by_batch(lines: &[InvoiceLine]) -> HashMap<String, f64> {
    let mut by_batch: HashMap<String, f64> = HashMap::new();
    for line in lines {
        let Some(batch) = line.batch_no.as_deref() else {
            continue;
        };
        let qty = line_stock_qty(line);
        if qty > 0.0 {
            *by_batch.entry(batch.to_string()).or_insert(0.0) += qty;
        }
    }
    by_batch
}

// =============================================================================
// Capacity Guard
// =============================================================================

/// Outcome of checking a requested quantity against a batch's capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchCapacity {
    /// Within capacity, or the batch carries no nominal size.
    Within,
    /// Requested quantity exceeds the batch's nominal size.
    Exceeded { requested: f64, capacity: f64 },
}

/// Checks a requested quantity against a batch's nominal size.
///
/// Advisory only: callers decide whether an exceeded capacity blocks the
/// document or merely warns.
pub fn check_batch_capacity(requested: f64, batch_size: Option<f64>) -> BatchCapacity {
    match batch_size {
        Some(capacity) if capacity > 0.0 && requested > capacity + QTY_EPSILON => {
            BatchCapacity::Exceeded {
                requested,
                capacity,
            }
        }
        _ => BatchCapacity::Within,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn line(qty: f64, rate_cents: i64, manual: Option<i64>) -> InvoiceLine {
        InvoiceLine {
            id: "l1".to_string(),
            invoice_id: "inv1".to_string(),
            item_code: "GENS-SUT-001".to_string(),
            item_name: None,
            description: None,
            qty,
            rate_cents,
            amount_cents: 0,
            manual_amount_cents: manual,
            batch_no: None,
            conversion_factor: None,
            stock_qty: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_manual_amount_derives_rate() {
        let mut l = line(4.0, 250, Some(1000));
        apply_line_amount(&mut l);
        assert_eq!(l.rate_cents, 250);
        assert_eq!(l.amount_cents, 1000);

        let mut l = line(3.0, 0, Some(1000));
        apply_line_amount(&mut l);
        assert_eq!(l.rate_cents, 333);
        assert_eq!(l.amount_cents, 1000);
    }

    #[test]
    fn test_default_amount_is_qty_times_rate() {
        let mut l = line(2.5, 400, None);
        apply_line_amount(&mut l);
        assert_eq!(l.amount_cents, 1000);
    }

    #[test]
    fn test_zero_qty_is_untouched() {
        let mut l = line(0.0, 400, Some(1000));
        apply_line_amount(&mut l);
        assert_eq!(l.amount_cents, 0);
        assert_eq!(l.rate_cents, 400);
    }

    #[test]
    fn test_line_stock_qty_prefers_explicit() {
        let mut l = line(5.0, 0, None);
        l.stock_qty = Some(50.0);
        l.conversion_factor = Some(10.0);
        assert_eq!(line_stock_qty(&l), 50.0);

        l.stock_qty = None;
        assert_eq!(line_stock_qty(&l), 50.0);

        l.conversion_factor = None;
        assert_eq!(line_stock_qty(&l), 5.0);
    }

    #[test]
    fn test_requested_by_batch_aggregates() {
        let mut a = line(2.0, 0, None);
        a.batch_no = Some("B-001".to_string());
        let mut b = line(3.0, 0, None);
        b.batch_no = Some("B-001".to_string());
        let mut c = line(4.0, 0, None);
        c.batch_no = Some("B-002".to_string());
        let d = line(9.0, 0, None); // no batch

        let req = requested_by_batch(&[a, b, c, d]);
        assert_eq!(req.len(), 2);
        assert_eq!(req["B-001"], 5.0);
        assert_eq!(req["B-002"], 4.0);
    }

    #[test]
    fn test_check_batch_capacity() {
        assert_eq!(check_batch_capacity(5.0, Some(10.0)), BatchCapacity::Within);
        assert_eq!(check_batch_capacity(5.0, None), BatchCapacity::Within);
        assert!(matches!(
            check_batch_capacity(11.0, Some(10.0)),
            BatchCapacity::Exceeded { .. }
        ));
    }
}
