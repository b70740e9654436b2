//! # Billing Service
//!
//! The transactional writes of the billing workflow. Every operation that
//! touches `products.stock_qty` lives here.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller (request + Actor)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  role check, input validation, totals   ── fail ──► Err, no tx opened  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──► first statement is a write (takes the SQLite write lock)    │
//! │       │                                                                 │
//! │       ├── every step Ok ──► COMMIT ──► Ok(id / new stock)              │
//! │       │                                                                 │
//! │       └── any step Err  ──► ROLLBACK ──► Err (caller sees no effect)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Stock changes are guarded single statements
//! (`UPDATE … WHERE stock_qty + delta >= 0 RETURNING stock_qty`), so the read
//! of the old quantity and the write of the new one cannot interleave with
//! another transaction. A concurrent writer waits on the busy timeout until
//! the first one commits.

mod error;

pub use error::{ErrorKind, ErrorReport, ServiceError, ServiceResult};

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{error, info, warn};

use crate::error::DbError;
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::stock::{NewStockLogEntry, StockLogRepository};
use inspire_core::access::authorize_status_change;
use inspire_core::validation::{validate_quantity, validate_reason, validate_reference};
use inspire_core::{
    Actor, AdjustmentType, CoreError, InvoiceStatus, NewInvoice, StockAdjustment,
    ValidatedInvoice,
};

/// Transactional write service.
///
/// ## Usage
/// ```rust,ignore
/// let billing = db.billing();
/// let invoice_id = billing.create_invoice(request, &actor).await?;
/// let new_qty = billing.adjust_stock(adjustment, &actor).await?;
/// billing.update_invoice_status(invoice_id, InvoiceStatus::Paid, &actor).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BillingService {
    pool: SqlitePool,
}

impl BillingService {
    /// Creates a new BillingService.
    pub fn new(pool: SqlitePool) -> Self {
        BillingService { pool }
    }

    // =========================================================================
    // Invoice Creation
    // =========================================================================

    /// Creates an invoice, its lines, and the matching stock decrements in
    /// one transaction.
    ///
    /// Any authenticated actor may create invoices.
    ///
    /// ## Returns
    /// The new invoice id.
    ///
    /// ## Errors
    /// * `Validation` - missing customer, no lines, bad line, bad discount or
    ///   tax rate, unknown customer or product
    /// * `InsufficientStock` - a line asks for more than is on hand; the
    ///   whole invoice is rejected
    /// * `Persistence` - any write failed; everything was rolled back
    pub async fn create_invoice(&self, request: NewInvoice, actor: &Actor) -> ServiceResult<i64> {
        let invoice = request.validate()?;

        let mut tx = self.pool.begin().await?;

        match Self::write_invoice(&mut tx, actor, &invoice).await {
            Ok(invoice_id) => {
                commit(tx).await?;

                info!(
                    invoice_id,
                    user_id = actor.user_id,
                    customer_id = invoice.customer_id,
                    lines = invoice.lines.len(),
                    subtotal = invoice.totals.subtotal.cents(),
                    tax = invoice.totals.tax_amount.cents(),
                    discount = invoice.totals.discount.cents(),
                    grand_total = invoice.totals.grand_total.cents(),
                    "Invoice created"
                );
                Ok(invoice_id)
            }
            Err(err) => Err(rollback(tx, err, "create_invoice").await),
        }
    }

    async fn write_invoice(
        conn: &mut SqliteConnection,
        actor: &Actor,
        invoice: &ValidatedInvoice,
    ) -> ServiceResult<i64> {
        let invoice_id = match InvoiceRepository::insert_invoice(conn, actor.user_id, invoice).await {
            Ok(id) => id,
            Err(err @ DbError::ForeignKeyViolation { .. }) => {
                if !CustomerRepository::exists(conn, invoice.customer_id).await? {
                    return Err(CoreError::CustomerNotFound(invoice.customer_id).into());
                }
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        for line in &invoice.lines {
            let line_total = line.unit_price().multiply_quantity(line.quantity);

            match InvoiceRepository::insert_item(conn, invoice_id, line, line_total).await {
                Ok(_) => {}
                Err(DbError::ForeignKeyViolation { .. }) => {
                    return Err(CoreError::ProductNotFound(line.product_id).into());
                }
                Err(err) => return Err(err.into()),
            }
        }

        // Stock moves once per product, by the quantity summed over its lines
        for (product_id, quantity) in invoice.quantities_by_product() {
            let decremented =
                ProductRepository::apply_stock_delta(conn, product_id, -quantity).await?;
            if decremented.is_none() {
                return Err(stock_shortfall(conn, product_id, quantity).await);
            }
        }

        Ok(invoice_id)
    }

    // =========================================================================
    // Stock Adjustment
    // =========================================================================

    /// Adds to or subtracts from a product's stock and appends a log entry,
    /// atomically. Admin only.
    ///
    /// ## Returns
    /// The new stock quantity.
    ///
    /// ## Errors
    /// * `Authorization` - actor is not an admin
    /// * `Validation` - quantity < 1, blank reason, unknown product
    /// * `InsufficientStock` - subtract larger than current stock; nothing
    ///   written
    /// * `Persistence` - write failed; both writes rolled back
    pub async fn adjust_stock(
        &self,
        adjustment: StockAdjustment,
        actor: &Actor,
    ) -> ServiceResult<i64> {
        if let Err(err) = actor.require_admin("adjust stock") {
            warn!(user_id = actor.user_id, role = %actor.role, "Stock adjustment refused");
            return Err(err.into());
        }

        validate_reference("product", Some(adjustment.product_id))?;
        validate_quantity(adjustment.quantity)?;
        let reason = validate_reason(&adjustment.reason)?;

        let mut tx = self.pool.begin().await?;

        match Self::write_adjustment(&mut tx, actor, &adjustment, &reason).await {
            Ok((stock_before, stock_after)) => {
                commit(tx).await?;

                info!(
                    product_id = adjustment.product_id,
                    user_id = actor.user_id,
                    adjustment_type = %adjustment.adjustment_type,
                    quantity = adjustment.quantity,
                    stock_before,
                    stock_after,
                    "Stock adjusted"
                );
                Ok(stock_after)
            }
            Err(err) => Err(rollback(tx, err, "adjust_stock").await),
        }
    }

    async fn write_adjustment(
        conn: &mut SqliteConnection,
        actor: &Actor,
        adjustment: &StockAdjustment,
        reason: &str,
    ) -> ServiceResult<(i64, i64)> {
        let product_id = adjustment.product_id;
        let delta = match adjustment.adjustment_type {
            AdjustmentType::Add => adjustment.quantity,
            AdjustmentType::Subtract => -adjustment.quantity,
        };

        let Some(stock_after) = ProductRepository::apply_stock_delta(conn, product_id, delta).await?
        else {
            return Err(stock_shortfall(conn, product_id, adjustment.quantity).await);
        };
        let stock_before = stock_after - delta;

        StockLogRepository::insert(
            conn,
            NewStockLogEntry {
                product_id,
                user_id: actor.user_id,
                adjustment_type: adjustment.adjustment_type,
                quantity: adjustment.quantity,
                reason,
                stock_before,
                stock_after,
            },
        )
        .await?;

        Ok((stock_before, stock_after))
    }

    // =========================================================================
    // Invoice Status
    // =========================================================================

    /// Changes the status of an invoice. Only `status` is ever updated.
    ///
    /// ## Errors
    /// * `NotFound` - no such invoice
    /// * `Authorization` - staff on someone else's invoice, staff cancelling,
    ///   or staff reopening a cancelled invoice
    /// * `Persistence` - the status changed underneath this call
    pub async fn update_invoice_status(
        &self,
        invoice_id: i64,
        status: InvoiceStatus,
        actor: &Actor,
    ) -> ServiceResult<()> {
        let invoices = InvoiceRepository::new(self.pool.clone());

        let invoice = invoices
            .get_by_id(invoice_id)
            .await?
            .ok_or(CoreError::InvoiceNotFound(invoice_id))?;

        if let Err(err) = authorize_status_change(actor, invoice.user_id, invoice.status, status) {
            warn!(
                invoice_id,
                user_id = actor.user_id,
                from = %invoice.status,
                to = %status,
                error = %err,
                "Status change refused"
            );
            return Err(err.into());
        }

        if invoice.status == status {
            return Ok(());
        }

        if !invoices.set_status_if(invoice_id, invoice.status, status).await? {
            return Err(DbError::TransactionFailed(format!(
                "invoice {invoice_id} changed status concurrently"
            ))
            .into());
        }

        info!(
            invoice_id,
            user_id = actor.user_id,
            from = %invoice.status,
            to = %status,
            "Invoice status updated"
        );
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn commit(tx: Transaction<'static, Sqlite>) -> ServiceResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()).into())
}

/// Rolls back and hands the original error back to the caller.
async fn rollback(
    tx: Transaction<'static, Sqlite>,
    err: ServiceError,
    operation: &'static str,
) -> ServiceError {
    if let Err(rollback_err) = tx.rollback().await {
        error!(operation, error = %rollback_err, cause = %err, "Rollback failed");
    }

    match err.kind() {
        ErrorKind::Persistence => error!(operation, error = %err, "Rolled back"),
        _ => warn!(operation, error = %err, "Rejected, rolled back"),
    }

    err
}

/// Explains why a guarded stock decrement matched no row.
async fn stock_shortfall(
    conn: &mut SqliteConnection,
    product_id: i64,
    requested: i64,
) -> ServiceError {
    match ProductRepository::stock_qty(conn, product_id).await {
        Ok(Some(available)) => CoreError::InsufficientStock {
            product_id,
            available,
            requested,
        }
        .into(),
        Ok(None) => CoreError::ProductNotFound(product_id).into(),
        Err(err) => err.into(),
    }
}
