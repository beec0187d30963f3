//! Customer operations.

use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use invoice_core::validation::{
    validate_customer_delete, validate_customer_update, validate_new_customer,
    validate_search_query,
};
use invoice_core::{CoreError, CreateCustomer, Customer, CustomerWithInvoices, UpdateCustomer};
use invoice_db::{Database, DbError};

/// Customer service.
#[derive(Debug, Clone)]
pub struct CustomerService {
    db: Database,
}

impl CustomerService {
    pub fn new(db: Database) -> Self {
        CustomerService { db }
    }

    /// Lists customers, newest first, optionally filtered.
    pub async fn list(&self, search: Option<&str>) -> ApiResult<Vec<Customer>> {
        let search = search.map(validate_search_query).transpose()?;
        Ok(self.db.customers().list(search.as_deref()).await?)
    }

    /// Gets a customer with all of their invoices, newest first.
    pub async fn get(&self, id: &str) -> ApiResult<CustomerWithInvoices> {
        let customer = self
            .db
            .customers()
            .get_by_id(id)
            .await?
            .ok_or(CoreError::CustomerNotFound)?;

        let invoices = self.db.invoices().list_for_customer(id).await?;

        Ok(CustomerWithInvoices { customer, invoices })
    }

    pub async fn create(&self, dto: CreateCustomer) -> ApiResult<Customer> {
        let existing = self.db.customers().get_by_email(&dto.email).await?;
        validate_new_customer(&dto, existing.as_ref())?;

        let customer = self
            .db
            .customers()
            .insert(&dto)
            .await
            .map_err(|e| match e {
                e if e.is_unique_violation_on("customers.email") => {
                    ApiError::from(CoreError::DuplicateEmail)
                }
                e => ApiError::from(e),
            })?;

        info!(id = %customer.id, email = %customer.email, "Customer created");
        Ok(customer)
    }

    pub async fn update(&self, id: &str, dto: UpdateCustomer) -> ApiResult<Customer> {
        let existing = self.db.customers().get_by_id(id).await?;
        let email_owner = match &dto.email {
            Some(email) => self.db.customers().get_by_email(email).await?,
            None => None,
        };

        validate_customer_update(id, &dto, existing.as_ref(), email_owner.as_ref())?;

        let customer = self
            .db
            .customers()
            .update(id, &dto)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => ApiError::from(CoreError::CustomerNotFound),
                e if e.is_unique_violation_on("customers.email") => {
                    ApiError::from(CoreError::EmailInUse)
                }
                e => ApiError::from(e),
            })?;

        debug!(id = %id, "Customer updated");
        Ok(customer)
    }

    /// Deletes a customer that owns no invoices.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let existing = self.db.customers().get_by_id(id).await?;
        let invoice_count = match existing {
            Some(_) => self.db.customers().count_invoices(id).await?,
            None => 0,
        };

        validate_customer_delete(existing.as_ref(), invoice_count)?;

        self.db.customers().delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => ApiError::from(CoreError::CustomerNotFound),
            // An invoice was attached between the count and the delete
            DbError::ForeignKeyViolation { .. } => {
                ApiError::from(CoreError::CustomerHasInvoices { invoice_count: 1 })
            }
            e => ApiError::from(e),
        })?;

        info!(id = %id, "Customer deleted");
        Ok(())
    }
}
