//! # Sales Repository
//!
//! Database operations for invoices, their lines, and price history.
//!
//! ## Invoice Lifecycle
//! ```text
//! 1. INSERT DRAFT      insert_invoice() / add_line()
//! 2. SUBMIT            mark_submitted()  (guarded draft → submitted)
//! 3. (OPTIONAL) CANCEL mark_cancelled()  (guarded submitted → cancelled)
//! ```
//!
//! Availability consumption around submit/cancel is orchestrated by
//! `InvoiceService`; the guarded status transitions here are what make a
//! double submit (or double cancel) a visible error instead of a double
//! stock movement.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use itemforge_core::{Invoice, InvoiceLine, PricePoint};

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    /// Creates a new SalesRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    /// Gets an invoice by ID.
    pub async fn get_invoice(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, customer, posting_date, update_stock, status,
                   created_at, updated_at
            FROM invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Inserts a draft invoice.
    pub async fn insert_invoice(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, customer = %invoice.customer, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, customer, posting_date, update_stock, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.customer)
        .bind(invoice.posting_date)
        .bind(invoice.update_stock)
        .bind(invoice.status)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds a line to an invoice.
    pub async fn add_line(&self, line: &InvoiceLine) -> DbResult<()> {
        debug!(invoice_id = %line.invoice_id, item = %line.item_code, "Adding invoice line");

        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, item_code, item_name, description,
                qty, rate_cents, amount_cents, manual_amount_cents,
                batch_no, conversion_factor, stock_qty, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&line.id)
        .bind(&line.invoice_id)
        .bind(&line.item_code)
        .bind(&line.item_name)
        .bind(&line.description)
        .bind(line.qty)
        .bind(line.rate_cents)
        .bind(line.amount_cents)
        .bind(line.manual_amount_cents)
        .bind(&line.batch_no)
        .bind(line.conversion_factor)
        .bind(line.stock_qty)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all lines for an invoice.
    pub async fn get_lines(&self, invoice_id: &str) -> DbResult<Vec<InvoiceLine>> {
        let lines = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT id, invoice_id, item_code, item_name, description,
                   qty, rate_cents, amount_cents, manual_amount_cents,
                   batch_no, conversion_factor, stock_qty, created_at
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Updates one line's computed pricing fields.
    pub async fn update_line_amount(&self, line: &InvoiceLine) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE invoice_items SET rate_cents = ?2, amount_cents = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&line.id)
        .bind(line.rate_cents)
        .bind(line.amount_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice line", &line.id));
        }

        Ok(())
    }

    /// Marks a draft invoice as submitted.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no draft invoice with this ID (already
    ///   submitted, cancelled, or missing)
    pub async fn mark_submitted(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE invoices SET status = 'submitted', updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice (draft)", id));
        }

        Ok(())
    }

    /// Marks a submitted invoice as cancelled.
    pub async fn mark_cancelled(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE invoices SET status = 'cancelled', updated_at = ?2
            WHERE id = ?1 AND status = 'submitted'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice (submitted)", id));
        }

        Ok(())
    }

    /// Historical prices of an item on submitted invoices, newest first.
    ///
    /// ## Arguments
    /// * `item_code` - Item to look up
    /// * `customer` - When set, restrict to this customer - or, with
    ///   `include_other`, to every customer *except* this one
    /// * `include_other` - Invert the customer filter
    /// * `limit` - Maximum observations returned
    pub async fn last_prices(
        &self,
        item_code: &str,
        customer: Option<&str>,
        include_other: bool,
        limit: i64,
    ) -> DbResult<Vec<PricePoint>> {
        let customer_filter = match customer {
            Some(_) if include_other => "AND i.customer != ?2",
            Some(_) => "AND i.customer = ?2",
            None => "",
        };

        let sql = format!(
            "SELECT i.id AS invoice, i.posting_date, li.rate_cents, i.customer \
             FROM invoice_items li \
             JOIN invoices i ON i.id = li.invoice_id \
             WHERE li.item_code = ?1 AND i.status = 'submitted' {customer_filter} \
             ORDER BY i.posting_date DESC, i.created_at DESC \
             LIMIT {limit}"
        );

        let mut query = sqlx::query_as::<_, PricePoint>(&sql).bind(item_code);
        if let Some(c) = customer {
            query = query.bind(c);
        }

        let rows = query.fetch_all(&self.pool).await?;
        debug!(item = %item_code, observations = rows.len(), "Loaded price history");
        Ok(rows)
    }
}

/// Helper to generate a new invoice ID.
pub fn generate_invoice_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new invoice line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::testutil;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_status_transitions_are_guarded() {
        let db = testutil::test_db().await;
        let sales = db.sales();

        let id = testutil::seed_invoice(&db, "City Clinic", false, &[]).await;

        sales.mark_submitted(&id).await.unwrap();
        // double submit is an error, not a silent no-op
        assert!(sales.mark_submitted(&id).await.is_err());

        sales.mark_cancelled(&id).await.unwrap();
        assert!(sales.mark_cancelled(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_last_prices_orders_and_filters() {
        let db = testutil::test_db().await;
        let sales = db.sales();

        let date = |d: u32| NaiveDate::from_ymd_opt(2026, 5, d).unwrap();

        testutil::seed_priced_invoice(&db, "City Clinic", date(1), "GENS-SUT-001", 500, true).await;
        testutil::seed_priced_invoice(&db, "City Clinic", date(9), "GENS-SUT-001", 650, true).await;
        testutil::seed_priced_invoice(&db, "Rural Store", date(5), "GENS-SUT-001", 600, true).await;
        // draft invoices are invisible to history
        testutil::seed_priced_invoice(&db, "City Clinic", date(20), "GENS-SUT-001", 999, false)
            .await;

        let all = sales
            .last_prices("GENS-SUT-001", None, false, 5)
            .await
            .unwrap();
        let rates: Vec<i64> = all.iter().map(|p| p.rate_cents).collect();
        assert_eq!(rates, vec![650, 600, 500]);

        let mine = sales
            .last_prices("GENS-SUT-001", Some("City Clinic"), false, 5)
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);

        let others = sales
            .last_prices("GENS-SUT-001", Some("City Clinic"), true, 5)
            .await
            .unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].customer, "Rural Store");
    }

    #[tokio::test]
    async fn test_update_line_amount_persists_recomputed_pricing() {
        let db = testutil::test_db().await;
        let sales = db.sales();

        let line = testutil::make_line("ignored", "GENS-SUT-001", 4.0, 0, Some(1000), None);
        let id = testutil::seed_invoice(&db, "City Clinic", false, &[line]).await;

        let mut lines = sales.get_lines(&id).await.unwrap();
        itemforge_core::billing::apply_line_amount(&mut lines[0]);
        sales.update_line_amount(&lines[0]).await.unwrap();

        let reloaded = sales.get_lines(&id).await.unwrap();
        assert_eq!(reloaded[0].rate_cents, 250);
        assert_eq!(reloaded[0].amount_cents, 1000);
    }

    #[tokio::test]
    async fn test_last_prices_respects_limit() {
        let db = testutil::test_db().await;
        let sales = db.sales();

        for d in 1..=4 {
            let date = NaiveDate::from_ymd_opt(2026, 5, d).unwrap();
            testutil::seed_priced_invoice(&db, "City Clinic", date, "GENS-SUT-001", 100, true)
                .await;
        }

        let points = sales
            .last_prices("GENS-SUT-001", None, false, 2)
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
    }
}
