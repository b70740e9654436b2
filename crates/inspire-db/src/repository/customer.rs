//! # Customer Repository
//!
//! Minimal customer access: invoices need a customer to point at.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use inspire_core::{Customer, NewCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and returns its ID.
    pub async fn insert(&self, customer: &NewCustomer) -> DbResult<i64> {
        debug!(full_name = %customer.full_name, "Inserting customer");

        let result = sqlx::query(
            r#"
            INSERT INTO customers (full_name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(customer.full_name.trim())
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, full_name, phone, email, address, created_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Checks existence on the caller's open transaction.
    pub async fn exists(conn: &mut SqliteConnection, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let id = db
            .customers()
            .insert(&NewCustomer {
                full_name: "  Ayesha Khan ".to_string(),
                phone: Some("0300-1234567".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let customer = db.customers().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(customer.full_name, "Ayesha Khan");
        assert_eq!(customer.phone.as_deref(), Some("0300-1234567"));
        assert!(customer.email.is_none());
    }
}
