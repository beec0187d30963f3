//! # User Repository
//!
//! Login accounts. The password hash is stored as an Argon2 PHC string
//! produced by the API layer; this module never sees a plain password.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use invoice_core::{new_id, User};

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

    /// Gets a user by exact email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a user with an already hashed password.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` on `users.email` if the email is taken.
    pub async fn insert(&self, email: &str, password_hash: &str, name: &str) -> DbResult<User> {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, email = %user.email, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert("admin@example.com", "$argon2id$stub", "Admin User")
            .await
            .unwrap();

        let by_email = db.users().get_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "$argon2id$stub");

        let by_id = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Admin User");

        assert!(db.users().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert("a@b.com", "h", "A").await.unwrap();

        let err = db.users().insert("a@b.com", "h", "B").await.unwrap_err();
        assert!(err.is_unique_violation_on("users.email"));
    }
}
