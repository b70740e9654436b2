//! # Invoice Repository
//!
//! Reads of invoices and their lines, plus the inserts `BillingService`
//! runs inside its transaction.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE (BillingService::create_invoice, one transaction)           │
//! │     └── insert_invoice()        → Invoice { status: Unpaid }           │
//! │     └── insert_item() × N       + stock decrement per line             │
//! │                                                                         │
//! │  2. STATUS (BillingService::update_invoice_status)                     │
//! │     └── set_status_if()         Unpaid ↔ Paid, → Cancelled (admin)     │
//! │                                                                         │
//! │  Totals and lines are never updated after step 1.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use inspire_core::{Invoice, InvoiceItem, InvoiceStatus, Money, NewInvoiceLine, ValidatedInvoice};

const INVOICE_COLUMNS: &str = r#"
    id, customer_id, user_id,
    subtotal_cents, tax_rate_bps, tax_amount_cents, discount_cents, grand_total_cents,
    status, notes, created_at
"#;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Gets the lines of an invoice, in the order they were entered.
    pub async fn items(&self, invoice_id: i64) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT
                id, invoice_id, product_id, product_name, size,
                quantity, unit_price_cents, line_total_cents
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists invoices newest first. `user_id` narrows to one creator (staff view).
    pub async fn list(&self, user_id: Option<i64>, limit: u32) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices
             WHERE ?1 IS NULL OR user_id = ?1
             ORDER BY id DESC
             LIMIT ?2"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    /// Counts invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts invoice lines across all invoices.
    pub async fn item_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts the invoice header with status `Unpaid`. Runs on the caller's
    /// open transaction.
    pub async fn insert_invoice(
        conn: &mut SqliteConnection,
        user_id: i64,
        invoice: &ValidatedInvoice,
    ) -> DbResult<i64> {
        let totals = &invoice.totals;
        debug!(
            customer_id = invoice.customer_id,
            user_id,
            grand_total = totals.grand_total.cents(),
            "Inserting invoice"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO invoices (
                customer_id, user_id,
                subtotal_cents, tax_rate_bps, tax_amount_cents, discount_cents, grand_total_cents,
                status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(invoice.customer_id)
        .bind(user_id)
        .bind(totals.subtotal.cents())
        .bind(totals.tax_rate.bps())
        .bind(totals.tax_amount.cents())
        .bind(totals.discount.cents())
        .bind(totals.grand_total.cents())
        .bind(InvoiceStatus::Unpaid)
        .bind(&invoice.notes)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts one invoice line with its name/size snapshot. Runs on the
    /// caller's open transaction.
    pub async fn insert_item(
        conn: &mut SqliteConnection,
        invoice_id: i64,
        line: &NewInvoiceLine,
        line_total: Money,
    ) -> DbResult<i64> {
        debug!(
            invoice_id,
            product_id = line.product_id,
            quantity = line.quantity,
            "Inserting invoice item"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO invoice_items (
                invoice_id, product_id, product_name, size,
                quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(invoice_id)
        .bind(line.product_id)
        .bind(line.product_name.trim())
        .bind(&line.size)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line_total.cents())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Moves an invoice from `from` to `to`, only if it is still in `from`.
    ///
    /// ## Returns
    /// `false` when the invoice is missing or its status changed meanwhile.
    pub async fn set_status_if(
        &self,
        id: i64,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> DbResult<bool> {
        debug!(id, %from, %to, "Updating invoice status");

        let result = sqlx::query("UPDATE invoices SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
