//! Invoice operations, including PDF export.

use serde_json::json;
use tracing::{debug, error, info};

use crate::error::{ApiError, ApiResult};
use invoice_core::validation::{validate_invoice_update, validate_new_invoice};
use invoice_core::{
    CoreError, CreateInvoice, InvoiceFilter, InvoiceListParams, InvoiceWithRelations,
    UpdateInvoice,
};
use invoice_db::{Database, DbError};
use invoice_pdf::{pdf_filename, render_invoice, RenderError};

/// Invoice service.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    db: Database,
}

impl InvoiceService {
    pub fn new(db: Database) -> Self {
        InvoiceService { db }
    }

    /// Lists invoices matching the query parameters.
    pub async fn list(&self, params: InvoiceListParams) -> ApiResult<Vec<InvoiceWithRelations>> {
        let filter = InvoiceFilter::from_params(params)?;
        Ok(self.db.invoices().list(&filter).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<InvoiceWithRelations> {
        let invoice = self
            .db
            .invoices()
            .get_by_id(id)
            .await?
            .ok_or(CoreError::InvoiceNotFound)?;
        Ok(invoice)
    }

    /// Creates an invoice after the engine accepts it.
    ///
    /// An unknown customer is a bad request here, not a missing resource.
    pub async fn create(&self, dto: CreateInvoice) -> ApiResult<InvoiceWithRelations> {
        let customer = self.db.customers().get_by_id(&dto.customer_id).await?;
        let number_owner = self.db.invoices().get_by_number(dto.number.trim()).await?;

        validate_new_invoice(&dto, customer.as_ref(), number_owner.as_ref())
            .map_err(customer_not_found_is_bad_request)?;

        let invoice = self
            .db
            .invoices()
            .create(&dto)
            .await
            .map_err(|e| match e {
                DbError::ForeignKeyViolation { .. } => {
                    customer_not_found_is_bad_request(CoreError::CustomerNotFound)
                }
                e => write_error(e, "Failed to create invoice"),
            })?;

        info!(
            id = %invoice.invoice.id,
            number = %invoice.invoice.number,
            total = %invoice.invoice.total_amount,
            "Invoice created"
        );
        Ok(invoice)
    }

    /// Applies a partial update. Status changes are unrestricted.
    pub async fn update(&self, id: &str, dto: UpdateInvoice) -> ApiResult<InvoiceWithRelations> {
        let existing = self.db.invoices().get_by_id(id).await?;

        let customer = match &dto.customer_id {
            Some(customer_id) => self.db.customers().get_by_id(customer_id).await?,
            None => None,
        };

        let number_owner = match &dto.number {
            Some(number) => self.db.invoices().get_by_number(number.trim()).await?,
            None => None,
        };

        validate_invoice_update(
            &dto,
            existing.as_ref(),
            customer.as_ref(),
            number_owner.as_ref(),
        )?;

        let invoice = self
            .db
            .invoices()
            .update(id, &dto)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => ApiError::from(CoreError::InvoiceNotFound),
                DbError::ForeignKeyViolation { .. } => ApiError::from(CoreError::CustomerNotFound),
                e => write_error(e, "Failed to update invoice"),
            })?;

        debug!(id = %id, status = %invoice.invoice.status, "Invoice updated");
        Ok(invoice)
    }

    /// Deletes an invoice and its items.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.db.invoices().delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => ApiError::from(CoreError::InvoiceNotFound),
            e => ApiError::from(e),
        })?;

        info!(id = %id, "Invoice deleted");
        Ok(())
    }

    /// Renders an invoice to PDF on the blocking pool.
    ///
    /// ## Returns
    /// `(filename, bytes)`, e.g. `("invoice-INV-2024-001.pdf", ...)`
    pub async fn export_pdf(&self, id: &str) -> ApiResult<(String, Vec<u8>)> {
        let invoice = self.get(id).await?;
        let filename = pdf_filename(&invoice.invoice.number);

        let bytes = tokio::task::spawn_blocking(move || render_invoice(&invoice))
            .await
            .map_err(|e| RenderError::RenderFailed(e.to_string()))??;

        debug!(id = %id, size = bytes.len(), "Invoice PDF rendered");
        Ok((filename, bytes))
    }
}

fn customer_not_found_is_bad_request(err: CoreError) -> ApiError {
    match err {
        CoreError::CustomerNotFound => ApiError::validation(err.to_string()),
        other => ApiError::from(other),
    }
}

/// Maps a failed invoice write: known conflicts keep their domain
/// message, anything else is a 500 carrying the underlying error.
fn write_error(err: DbError, message: &str) -> ApiError {
    if err.is_unique_violation_on("invoices.number") {
        return ApiError::from(CoreError::DuplicateNumber);
    }

    match err {
        known @ (DbError::NotFound { .. } | DbError::UniqueViolation { .. }) => {
            ApiError::from(known)
        }
        other => {
            error!(error = %other, "{}", message);
            ApiError::internal(message).with_details(json!(other.to_string()))
        }
    }
}
