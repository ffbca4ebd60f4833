//! # Invoice Service
//!
//! Document-lifecycle customizations for sales invoices: line pricing
//! with the manual-amount override, customer item naming, batch capacity
//! warnings, and availability consumption on submit/cancel.
//!
//! ## Lifecycle Hooks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Invoice Customizations                          │
//! │                                                                     │
//! │  validate (draft edit)                                              │
//! │    ├── prepare_lines: manual amounts + customer item names          │
//! │    └── batch_size_warnings: advisory, never blocks                  │
//! │                                                                     │
//! │  submit                                                             │
//! │    ├── validate availability (hard error on shortfall)              │
//! │    ├── guarded draft → submitted transition                         │
//! │    └── consume: available_qty -= requested per batch                │
//! │                                                                     │
//! │  cancel                                                             │
//! │    ├── guarded submitted → cancelled transition                     │
//! │    └── revert: available_qty += requested per batch                 │
//! │                                                                     │
//! │  Only stock-affecting invoices (update_stock) touch availability.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::batch::BatchRepository;
use crate::repository::mapping::MappingRepository;
use crate::repository::sales::SalesRepository;
use itemforge_core::billing::{self, BatchCapacity, QTY_EPSILON};
use itemforge_core::mapping as mapping_rules;
use itemforge_core::InvoiceLine;

// =============================================================================
// Result Types
// =============================================================================

/// Advisory warning: a line requests more than its batch's nominal size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSizeWarning {
    pub item_code: String,
    pub batch_no: String,
    pub requested: f64,
    pub capacity: f64,
}

/// Hard violation: a batch holds less than the document requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityViolation {
    pub batch_no: String,
    pub requested: f64,
    pub available: f64,
}

// =============================================================================
// Service
// =============================================================================

/// Service for invoice document customizations.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    sales: SalesRepository,
    batches: BatchRepository,
    mappings: MappingRepository,
}

impl InvoiceService {
    /// Creates a new InvoiceService.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceService {
            sales: SalesRepository::new(pool.clone()),
            batches: BatchRepository::new(pool.clone()),
            mappings: MappingRepository::new(pool),
        }
    }

    /// Recomputes amounts and applies customer item names to lines.
    ///
    /// The in-memory lines are rewritten; persisting them is the
    /// caller's business (hosts usually hold the document in memory
    /// during validation).
    pub async fn prepare_lines(
        &self,
        customer: Option<&str>,
        lines: &mut [InvoiceLine],
    ) -> DbResult<()> {
        for line in lines.iter_mut() {
            billing::apply_line_amount(line);
        }
        self.apply_customer_names(customer, lines).await
    }

    /// Rewrites line names/descriptions from the customer's mappings.
    ///
    /// Lines without an applicable mapping keep their catalog values.
    pub async fn apply_customer_names(
        &self,
        customer: Option<&str>,
        lines: &mut [InvoiceLine],
    ) -> DbResult<()> {
        let item_codes: Vec<String> = lines.iter().map(|l| l.item_code.clone()).collect();
        if item_codes.is_empty() {
            return Ok(());
        }

        let resolved = self
            .mappings
            .resolve_for_customer(&item_codes, customer)
            .await?;

        for line in lines.iter_mut() {
            if let Some(choice) = resolved.get(&line.item_code) {
                mapping_rules::apply_to_line(line, choice);
            }
        }

        debug!(
            lines = lines.len(),
            mapped = resolved.len(),
            "Applied customer item names"
        );
        Ok(())
    }

    /// Checks each line's quantity against its batch's nominal size.
    ///
    /// Advisory: the host shows these to the user, nothing is blocked.
    pub async fn batch_size_warnings(
        &self,
        lines: &[InvoiceLine],
    ) -> DbResult<Vec<BatchSizeWarning>> {
        let mut warnings = Vec::new();

        for line in lines {
            let Some(batch_no) = line.batch_no.as_deref() else {
                continue;
            };
            let Some(batch) = self.batches.get(batch_no).await? else {
                continue;
            };

            if let BatchCapacity::Exceeded {
                requested,
                capacity,
            } = billing::check_batch_capacity(line.qty, batch.batch_size)
            {
                warn!(
                    item = %line.item_code,
                    batch = %batch_no,
                    requested = %requested,
                    capacity = %capacity,
                    "Line exceeds batch size"
                );
                warnings.push(BatchSizeWarning {
                    item_code: line.item_code.clone(),
                    batch_no: batch_no.to_string(),
                    requested,
                    capacity,
                });
            }
        }

        Ok(warnings)
    }

    /// Computes per-batch availability violations for a set of lines.
    ///
    /// Unknown batches count as zero available.
    pub async fn availability_violations(
        &self,
        lines: &[InvoiceLine],
    ) -> DbResult<Vec<AvailabilityViolation>> {
        let requested = billing::requested_by_batch(lines);
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<String> = requested.keys().cloned().collect();
        let available = self.batches.available_for(&names).await?;

        let mut violations: Vec<AvailabilityViolation> = requested
            .into_iter()
            .filter_map(|(batch_no, needed)| {
                let avail = available.get(&batch_no).copied().unwrap_or(0.0);
                (needed > avail + QTY_EPSILON).then(|| AvailabilityViolation {
                    batch_no,
                    requested: needed,
                    available: avail,
                })
            })
            .collect();

        violations.sort_by(|a, b| a.batch_no.cmp(&b.batch_no));
        Ok(violations)
    }

    /// Submits a draft invoice.
    ///
    /// Stock-affecting invoices are checked against batch availability
    /// first and fail whole on any shortfall; the guarded status
    /// transition then makes a concurrent double submit an error rather
    /// than a double consumption, and only after that are the per-batch
    /// quantities consumed.
    pub async fn submit(&self, invoice_id: &str) -> DbResult<()> {
        let invoice = self
            .sales
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", invoice_id))?;
        let lines = self.sales.get_lines(invoice_id).await?;

        if invoice.update_stock {
            let violations = self.availability_violations(&lines).await?;
            if !violations.is_empty() {
                let details = violations
                    .iter()
                    .map(|v| {
                        format!(
                            "- {} needs {} but only {} available",
                            v.batch_no, v.requested, v.available
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(DbError::InsufficientBatchQty { details });
            }
        }

        self.sales.mark_submitted(invoice_id).await?;

        if invoice.update_stock {
            for (batch_no, qty) in billing::requested_by_batch(&lines) {
                self.batches.adjust_available(&batch_no, -qty).await?;
            }
        }

        info!(invoice = %invoice_id, update_stock = %invoice.update_stock, "Invoice submitted");
        Ok(())
    }

    /// Cancels a submitted invoice, returning consumed availability.
    pub async fn cancel(&self, invoice_id: &str) -> DbResult<()> {
        let invoice = self
            .sales
            .get_invoice(invoice_id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", invoice_id))?;
        let lines = self.sales.get_lines(invoice_id).await?;

        self.sales.mark_cancelled(invoice_id).await?;

        if invoice.update_stock {
            for (batch_no, qty) in billing::requested_by_batch(&lines) {
                self.batches.adjust_available(&batch_no, qty).await?;
            }
        }

        info!(invoice = %invoice_id, "Invoice cancelled");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn line(item: &str, qty: f64, rate: i64, manual: Option<i64>, batch: Option<&str>) -> InvoiceLine {
        testutil::make_line("inv-mem", item, qty, rate, manual, batch)
    }

    #[tokio::test]
    async fn test_prepare_lines_applies_amounts_and_names() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        db.mappings()
            .insert_customer("City Clinic", Some("Hospitals"))
            .await
            .unwrap();
        testutil::seed_mapping(
            &db,
            "GENS-SUT-001",
            Some("City Clinic"),
            None,
            Some(1),
            "Clinic Suture",
        )
        .await;

        let mut lines = vec![
            line("GENS-SUT-001", 4.0, 0, Some(1000), None),
            line("GENS-SUT-002", 2.0, 300, None, None),
        ];

        service
            .prepare_lines(Some("City Clinic"), &mut lines)
            .await
            .unwrap();

        // manual amount drove the rate; mapping renamed the line
        assert_eq!(lines[0].rate_cents, 250);
        assert_eq!(lines[0].amount_cents, 1000);
        assert_eq!(lines[0].item_name.as_deref(), Some("Clinic Suture"));

        // unmapped line got plain qty * rate and kept its name
        assert_eq!(lines[1].amount_cents, 600);
        assert_eq!(lines[1].item_name, None);
    }

    #[tokio::test]
    async fn test_batch_size_warnings_are_advisory() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        testutil::seed_batch(&db, "B-001", Some(10.0), 100.0).await;

        let lines = vec![
            line("GENS-SUT-001", 12.0, 100, None, Some("B-001")),
            line("GENS-SUT-002", 5.0, 100, None, Some("B-001")),
            line("GENS-SUT-003", 50.0, 100, None, Some("ghost")),
        ];

        let warnings = service.batch_size_warnings(&lines).await.unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].batch_no, "B-001");
        assert_eq!(warnings[0].requested, 12.0);
        assert_eq!(warnings[0].capacity, 10.0);

        // warnings travel to the host as plain data
        let json = serde_json::to_value(&warnings[0]).unwrap();
        assert_eq!(json["batch_no"], "B-001");
    }

    #[tokio::test]
    async fn test_submit_consumes_and_cancel_reverts() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        testutil::seed_batch(&db, "B-001", Some(100.0), 50.0).await;

        let lines = vec![
            line("GENS-SUT-001", 10.0, 100, None, Some("B-001")),
            line("GENS-SUT-002", 5.0, 100, None, Some("B-001")),
        ];
        let id = testutil::seed_invoice(&db, "City Clinic", true, &lines).await;

        service.submit(&id).await.unwrap();
        let after_submit = db.batches().get("B-001").await.unwrap().unwrap();
        assert!((after_submit.available_qty - 35.0).abs() < 1e-9);

        service.cancel(&id).await.unwrap();
        let after_cancel = db.batches().get("B-001").await.unwrap().unwrap();
        assert!((after_cancel.available_qty - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_submit_fails_whole_on_shortfall() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        testutil::seed_batch(&db, "B-001", None, 5.0).await;

        let lines = vec![line("GENS-SUT-001", 10.0, 100, None, Some("B-001"))];
        let id = testutil::seed_invoice(&db, "City Clinic", true, &lines).await;

        let err = service.submit(&id).await.unwrap_err();
        assert!(matches!(err, DbError::InsufficientBatchQty { .. }));

        // nothing consumed, invoice still draft and resubmittable later
        let batch = db.batches().get("B-001").await.unwrap().unwrap();
        assert!((batch.available_qty - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_submit_without_update_stock_skips_availability() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        // no batch rows at all: a non-stock invoice must not care
        let lines = vec![line("GENS-SUT-001", 10.0, 100, None, Some("ghost"))];
        let id = testutil::seed_invoice(&db, "City Clinic", false, &lines).await;

        service.submit(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_conversion_factor_feeds_consumption() {
        let db = testutil::test_db().await;
        let service = db.invoices();

        testutil::seed_batch(&db, "B-001", None, 100.0).await;

        // 2 boxes of 12 -> 24 stock units
        let mut boxed = line("GENS-SUT-001", 2.0, 100, None, Some("B-001"));
        boxed.conversion_factor = Some(12.0);
        let id = testutil::seed_invoice(&db, "City Clinic", true, &[boxed]).await;

        service.submit(&id).await.unwrap();
        let batch = db.batches().get("B-001").await.unwrap().unwrap();
        assert!((batch.available_qty - 76.0).abs() < 1e-9);
    }
}
