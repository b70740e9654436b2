//! # User Repository
//!
//! Users as seen by billing: an id, a name and a role. Password hashes stay
//! with the login layer and are never read here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use inspire_core::{NewUser, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user and returns its ID.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` when the username is taken.
    pub async fn insert(&self, user: &NewUser) -> DbResult<i64> {
        debug!(username = %user.username, role = %user.role, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, full_name, role, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &user.username),
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, role, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use inspire_core::Role;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            full_name: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let id = users.insert(&new_user("admin", Role::Admin)).await.unwrap();
        let user = users.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, Role::Admin);

        let staff_id = users.insert(&new_user("counter1", Role::Staff)).await.unwrap();
        let staff = users.get_by_username("counter1").await.unwrap().unwrap();
        assert_eq!(staff.id, staff_id);
        assert_eq!(staff.role, Role::Staff);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(&new_user("admin", Role::Admin)).await.unwrap();

        let err = db
            .users()
            .insert(&new_user("admin", Role::Staff))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref value, .. } if value == "admin"
        ));
    }
}
