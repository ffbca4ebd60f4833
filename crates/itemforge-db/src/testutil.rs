//! Shared helpers for database tests: throwaway databases and seed data.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use itemforge_core::{
    Batch, CustomerMapping, Invoice, InvoiceLine, InvoiceStatus, Item, ItemGroup,
};

/// Fresh migrated in-memory database (single connection).
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// Fresh migrated file-backed database for tests that need real
/// connection-level concurrency. Callers clean up with
/// [`remove_file_db`].
pub(crate) async fn file_db(max_connections: u32) -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!("itemforge-test-{}.db", Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(max_connections))
        .await
        .expect("file-backed database");
    (db, path)
}

/// Best-effort removal of a file-backed test database (plus WAL sidecars).
pub(crate) fn remove_file_db(path: &Path) {
    let _ = std::fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(side));
    }
}

pub(crate) async fn seed_group(
    db: &Database,
    name: &str,
    parent: Option<&str>,
    code_prefix: Option<&str>,
) {
    let now = Utc::now();
    db.item_groups()
        .insert(&ItemGroup {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            code_prefix: code_prefix.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seed item group");
}

/// Seeds an item and returns its generated id.
pub(crate) async fn seed_item(
    db: &Database,
    item_code: Option<&str>,
    name: &str,
    item_group: Option<&str>,
) -> String {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    db.items()
        .insert(&Item {
            id: id.clone(),
            item_code: item_code.map(str::to_string),
            name: name.to_string(),
            description: None,
            item_group: item_group.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seed item");
    id
}

pub(crate) async fn seed_mapping(
    db: &Database,
    item_code: &str,
    customer: Option<&str>,
    customer_group: Option<&str>,
    priority: Option<i64>,
    item_name: &str,
) {
    db.mappings()
        .insert(&CustomerMapping {
            id: Uuid::new_v4().to_string(),
            item_code: item_code.to_string(),
            customer: customer.map(str::to_string),
            customer_group: customer_group.map(str::to_string),
            customer_item_name: Some(item_name.to_string()),
            customer_description: Some(format!("{item_name} description")),
            priority,
            is_active: true,
            modified_at: Utc::now(),
        })
        .await
        .expect("seed mapping");
}

pub(crate) async fn seed_batch(
    db: &Database,
    name: &str,
    batch_size: Option<f64>,
    available_qty: f64,
) {
    let now = Utc::now();
    db.batches()
        .insert(&Batch {
            name: name.to_string(),
            item_code: None,
            batch_size,
            available_qty,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seed batch");
}

/// Builds an unsaved invoice line with sensible defaults.
pub(crate) fn make_line(
    invoice_id: &str,
    item_code: &str,
    qty: f64,
    rate_cents: i64,
    manual_amount_cents: Option<i64>,
    batch_no: Option<&str>,
) -> InvoiceLine {
    InvoiceLine {
        id: Uuid::new_v4().to_string(),
        invoice_id: invoice_id.to_string(),
        item_code: item_code.to_string(),
        item_name: None,
        description: None,
        qty,
        rate_cents,
        amount_cents: 0,
        manual_amount_cents,
        batch_no: batch_no.map(str::to_string),
        conversion_factor: None,
        stock_qty: None,
        created_at: Utc::now(),
    }
}

/// Seeds a draft invoice with the given lines; returns the invoice id.
/// Line `invoice_id` fields are rewritten to the new invoice.
pub(crate) async fn seed_invoice(
    db: &Database,
    customer: &str,
    update_stock: bool,
    lines: &[InvoiceLine],
) -> String {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    let sales = db.sales();

    sales
        .insert_invoice(&Invoice {
            id: id.clone(),
            customer: customer.to_string(),
            posting_date: now.date_naive(),
            update_stock,
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seed invoice");

    for line in lines {
        let mut line = line.clone();
        line.invoice_id = id.clone();
        sales.add_line(&line).await.expect("seed invoice line");
    }

    id
}

/// Seeds a one-line invoice with a rate, optionally submitted, for
/// price-history tests.
pub(crate) async fn seed_priced_invoice(
    db: &Database,
    customer: &str,
    posting_date: NaiveDate,
    item_code: &str,
    rate_cents: i64,
    submitted: bool,
) -> String {
    let now = Utc::now();
    let id = Uuid::new_v4().to_string();
    let sales = db.sales();

    sales
        .insert_invoice(&Invoice {
            id: id.clone(),
            customer: customer.to_string(),
            posting_date,
            update_stock: false,
            status: InvoiceStatus::Draft,
            created_at: now,
            updated_at: now,
        })
        .await
        .expect("seed invoice");

    let mut line = make_line(&id, item_code, 1.0, rate_cents, None, None);
    line.amount_cents = rate_cents;
    sales.add_line(&line).await.expect("seed invoice line");

    if submitted {
        sales.mark_submitted(&id).await.expect("submit invoice");
    }

    id
}
