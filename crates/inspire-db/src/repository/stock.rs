//! # Stock Log Repository
//!
//! The append-only audit trail of manual stock adjustments. Rows are only
//! ever inserted (by `BillingService::adjust_stock`); triggers in the schema
//! reject UPDATE and DELETE.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use inspire_core::{AdjustmentType, StockLogEntry};

const ENTRY_COLUMNS: &str = r#"
    l.id, l.product_id, l.user_id, l.adjustment_type, l.quantity, l.reason,
    l.stock_before, l.stock_after, l.created_at
"#;

/// A log entry joined with the names shown on the stock page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockLogView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: StockLogEntry,
    pub product_name: String,
    pub product_size: Option<String>,
    pub username: String,
}

/// Row values for a new log entry.
#[derive(Debug, Clone, Copy)]
pub struct NewStockLogEntry<'a> {
    pub product_id: i64,
    pub user_id: i64,
    pub adjustment_type: AdjustmentType,
    pub quantity: i64,
    pub reason: &'a str,
    pub stock_before: i64,
    pub stock_after: i64,
}

/// Repository for the stock log.
#[derive(Debug, Clone)]
pub struct StockLogRepository {
    pool: SqlitePool,
}

impl StockLogRepository {
    /// Creates a new StockLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockLogRepository { pool }
    }

    /// Most recent adjustments across all products, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<StockLogView>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS},
                    p.name AS product_name, p.size AS product_size, u.username
             FROM stock_log l
             JOIN products p ON p.id = l.product_id
             JOIN users u ON u.id = l.user_id
             ORDER BY l.id DESC
             LIMIT ?1"
        );

        let rows = sqlx::query_as::<_, StockLogView>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// All adjustments for one product, oldest first.
    pub async fn for_product(&self, product_id: i64) -> DbResult<Vec<StockLogEntry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM stock_log l WHERE l.product_id = ?1 ORDER BY l.id");

        let rows = sqlx::query_as::<_, StockLogEntry>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Counts all log entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Appends an entry. Runs on the caller's open transaction.
    pub async fn insert(conn: &mut SqliteConnection, entry: NewStockLogEntry<'_>) -> DbResult<i64> {
        debug!(
            product_id = entry.product_id,
            adjustment_type = %entry.adjustment_type,
            quantity = entry.quantity,
            stock_before = entry.stock_before,
            stock_after = entry.stock_after,
            "Appending stock log entry"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO stock_log (
                product_id, user_id, adjustment_type, quantity, reason,
                stock_before, stock_after, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(entry.product_id)
        .bind(entry.user_id)
        .bind(entry.adjustment_type)
        .bind(entry.quantity)
        .bind(entry.reason)
        .bind(entry.stock_before)
        .bind(entry.stock_after)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
