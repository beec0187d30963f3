//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Search
//! ```text
//! GET /api/customers?search=acme
//!      │
//!      ▼
//! name LIKE '%acme%' OR email LIKE '%acme%' OR tax_number LIKE '%acme%'
//!      │   (SQLite LIKE: case-insensitive for ASCII)
//!      ▼
//! ORDER BY created_at DESC (newest first)
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::contains_pattern;
use crate::error::{DbError, DbResult};
use invoice_core::{new_id, CreateCustomer, Customer, UpdateCustomer};

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

    /// Lists customers, newest first, optionally filtered by a search term
    /// matched against name, email and tax number.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Customer>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        debug!(search = ?pattern, "Listing customers");

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, tax_number, address, created_at, updated_at
            FROM customers
            WHERE ?1 IS NULL
               OR name LIKE ?1 ESCAPE '\'
               OR email LIKE ?1 ESCAPE '\'
               OR tax_number LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = customers.len(), "Customer list returned");
        Ok(customers)
    }

    /// Gets a customer by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, tax_number, address, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by exact (case-sensitive) email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, email, tax_number, address, created_at, updated_at
            FROM customers
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer and returns it.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` on `customers.email` if the email is taken.
    pub async fn insert(&self, dto: &CreateCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: new_id(),
            name: dto.name.trim().to_string(),
            email: dto.email.clone(),
            tax_number: dto.tax_number.clone(),
            address: dto.address.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, tax_number, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.tax_number)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Applies a partial update; absent fields keep their stored value.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no customer with this ID
    /// * `DbError::UniqueViolation` - the new email is taken
    pub async fn update(&self, id: &str, dto: &UpdateCustomer) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE(?1, name),
                email = COALESCE(?2, email),
                tax_number = COALESCE(?3, tax_number),
                address = COALESCE(?4, address),
                updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(dto.name.as_deref().map(str::trim))
        .bind(&dto.email)
        .bind(&dto.tax_number)
        .bind(&dto.address)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no customer with this ID (also on a repeat delete)
    /// * `DbError::ForeignKeyViolation` - the customer still owns invoices
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts the invoices owned by a customer.
    pub async fn count_invoices(&self, id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE customer_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use invoice_core::{CreateCustomer, UpdateCustomer};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn acme() -> CreateCustomer {
        CreateCustomer {
            name: "Acme Corporation".to_string(),
            email: "contact@acme.com".to_string(),
            tax_number: Some("TAX-001-ACME".to_string()),
            address: Some("123 Business St, New York, NY 10001".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = setup().await;
        let created = db.customers().insert(&acme()).await.unwrap();

        let by_id = db.customers().get_by_id(&created.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&created));

        let by_email = db.customers().get_by_email("contact@acme.com").await.unwrap();
        assert_eq!(by_email.map(|c| c.id), Some(created.id));

        // Collation is binary: different case is a different email
        let upper = db.customers().get_by_email("CONTACT@ACME.COM").await.unwrap();
        assert!(upper.is_none());
    }

    #[tokio::test]
    async fn test_unique_email_constraint() {
        let db = setup().await;
        db.customers().insert(&acme()).await.unwrap();

        let err = db.customers().insert(&acme()).await.unwrap_err();
        assert!(err.is_unique_violation_on("customers.email"));
    }

    #[tokio::test]
    async fn test_search_matches_name_email_and_tax_number() {
        let db = setup().await;
        db.customers().insert(&acme()).await.unwrap();
        db.customers()
            .insert(&CreateCustomer {
                name: "Tech Solutions Inc".to_string(),
                email: "info@techsolutions.com".to_string(),
                tax_number: Some("TAX-002-TECH".to_string()),
                address: None,
            })
            .await
            .unwrap();

        let all = db.customers().list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].name, "Tech Solutions Inc");

        let by_name = db.customers().list(Some("ACME")).await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_tax = db.customers().list(Some("002-tech")).await.unwrap();
        assert_eq!(by_tax[0].email, "info@techsolutions.com");

        let blank = db.customers().list(Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 2);

        let wildcard = db.customers().list(Some("%")).await.unwrap();
        assert!(wildcard.is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() {
        let db = setup().await;
        let created = db.customers().insert(&acme()).await.unwrap();

        let updated = db
            .customers()
            .update(
                &created.id,
                &UpdateCustomer {
                    name: Some("Acme Corp".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Acme Corp");
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.tax_number, created.tax_number);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = setup().await;

        let err = db
            .customers()
            .update("missing", &UpdateCustomer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.customers().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_twice_fails_the_second_time() {
        let db = setup().await;
        let created = db.customers().insert(&acme()).await.unwrap();

        db.customers().delete(&created.id).await.unwrap();
        assert!(matches!(
            db.customers().delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(db.customers().count_invoices(&created.id).await.unwrap(), 0);
    }
}
