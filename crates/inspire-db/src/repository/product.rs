//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Is Not Editable Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.stock_qty has exactly two writers, both in BillingService:   │
//! │                                                                         │
//! │    create_invoice ──► apply_stock_delta(−qty)  per invoice line        │
//! │    adjust_stock   ──► apply_stock_delta(±qty)  + stock_log row         │
//! │                                                                         │
//! │  The delta is guarded in SQL, so read and write are one statement:     │
//! │                                                                         │
//! │    UPDATE products SET stock_qty = stock_qty + :delta                  │
//! │    WHERE id = :id AND stock_qty + :delta >= 0                          │
//! │    RETURNING stock_qty                                                 │
//! │                                                                         │
//! │  No row back means "unknown product" or "not enough stock".            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use inspire_core::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, name, description, brand, size, color,
    price_cents, purchase_price_cents, stock_qty,
    supplier_name, supplier_phone, image_path, created_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let id = repo.insert(&new_product).await?;
/// let product = repo.get_by_id(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, size LIMIT ?1");

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a product and returns its ID.
    ///
    /// `product.stock_qty` is the opening stock; afterwards stock only moves
    /// through invoices and adjustments.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i64> {
        debug!(name = %product.name, size = ?product.size, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, description, brand, size, color,
                price_cents, purchase_price_cents, stock_qty,
                supplier_name, supplier_phone, image_path, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(&product.size)
        .bind(&product.color)
        .bind(product.price_cents)
        .bind(product.purchase_price_cents)
        .bind(product.stock_qty)
        .bind(&product.supplier_name)
        .bind(&product.supplier_phone)
        .bind(&product.image_path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Counts products (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Transaction-scoped stock access
    // =========================================================================

    /// Applies `delta` to a product's stock unless it would go negative.
    ///
    /// Runs on the caller's open transaction.
    ///
    /// ## Returns
    /// * `Some(new_qty)` - stock was changed
    /// * `None` - product missing, or `stock_qty + delta < 0` (nothing written)
    pub async fn apply_stock_delta(
        conn: &mut SqliteConnection,
        product_id: i64,
        delta: i64,
    ) -> DbResult<Option<i64>> {
        debug!(product_id, delta, "Applying stock delta");

        let new_qty: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_qty = stock_qty + ?2
            WHERE id = ?1 AND stock_qty + ?2 >= 0
            RETURNING stock_qty
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(new_qty)
    }

    /// Reads a product's stock on the caller's open transaction.
    pub async fn stock_qty(conn: &mut SqliteConnection, product_id: i64) -> DbResult<Option<i64>> {
        let qty: Option<i64> = sqlx::query_scalar("SELECT stock_qty FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn sneaker(stock_qty: i64) -> NewProduct {
        NewProduct {
            name: "Court Classic".to_string(),
            brand: Some("Inspire".to_string()),
            size: Some("42".to_string()),
            color: Some("White".to_string()),
            price_cents: 450_000,
            purchase_price_cents: Some(300_000),
            stock_qty,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let id = repo.insert(&sneaker(12)).await.unwrap();
        let product = repo.get_by_id(id).await.unwrap().unwrap();

        assert_eq!(product.name, "Court Classic");
        assert_eq!(product.size.as_deref(), Some("42"));
        assert_eq!(product.price().cents(), 450_000);
        assert_eq!(product.stock_qty, 12);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name_and_size() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&NewProduct {
            name: "Zebra Loafer".to_string(),
            price_cents: 100,
            ..Default::default()
        })
        .await
        .unwrap();
        repo.insert(&sneaker(1)).await.unwrap();

        let names: Vec<String> = repo.list(10).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Court Classic", "Zebra Loafer"]);
        assert_eq!(repo.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_negative_opening_stock_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.products().insert(&sneaker(-1)).await.unwrap_err();
        assert!(matches!(err, crate::DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_apply_stock_delta_is_guarded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let id = db.products().insert(&sneaker(5)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(
            ProductRepository::apply_stock_delta(&mut conn, id, -5).await.unwrap(),
            Some(0)
        );
        assert_eq!(
            ProductRepository::apply_stock_delta(&mut conn, id, -1).await.unwrap(),
            None
        );
        assert_eq!(
            ProductRepository::apply_stock_delta(&mut conn, id, 3).await.unwrap(),
            Some(3)
        );
        assert_eq!(
            ProductRepository::apply_stock_delta(&mut conn, 999, 1).await.unwrap(),
            None
        );
        assert_eq!(ProductRepository::stock_qty(&mut conn, id).await.unwrap(), Some(3));
    }
}
