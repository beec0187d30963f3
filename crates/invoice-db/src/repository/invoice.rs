//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Storage Layout
//! ```text
//! ┌──────────────────────┐        ┌─────────────────────────────┐
//! │ invoices             │ 1    * │ invoice_items               │
//! │  id, number (UNIQUE) │───────►│  invoice_id (CASCADE)       │
//! │  customer_id ────────┼──┐     │  position (submission order)│
//! │  total_cents         │  │     │  unit_price_cents           │
//! └──────────────────────┘  │     │  total_cents                │
//!                           │     └─────────────────────────────┘
//!                           ▼
//!                    customers (RESTRICT)
//! ```
//!
//! ## Write Atomicity
//! Create and update each run in one transaction: the header and the full
//! item set are written together or not at all. Updating items always
//! deletes the old set and inserts the new one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::contains_pattern;
use crate::error::{DbError, DbResult};
use invoice_core::{
    new_id, CreateInvoice, Customer, Invoice, InvoiceFilter, InvoiceItem, InvoiceItemInput,
    InvoiceStatus, InvoiceWithRelations, Money, UpdateInvoice,
};

// =============================================================================
// Records
// =============================================================================

/// Invoice header row.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRecord {
    id: String,
    customer_id: String,
    number: String,
    date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    status: InvoiceStatus,
    total_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InvoiceRecord> for Invoice {
    fn from(record: InvoiceRecord) -> Self {
        Invoice {
            id: record.id,
            customer_id: record.customer_id,
            number: record.number,
            date: record.date,
            due_date: record.due_date,
            status: record.status,
            total_amount: Money::from_cents(record.total_cents),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Line item row.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceItemRecord {
    id: String,
    invoice_id: String,
    description: String,
    quantity: i64,
    unit_price_cents: i64,
    total_cents: i64,
}

impl From<InvoiceItemRecord> for InvoiceItem {
    fn from(record: InvoiceItemRecord) -> Self {
        InvoiceItem {
            id: record.id,
            invoice_id: record.invoice_id,
            description: record.description,
            quantity: record.quantity,
            unit_price: Money::from_cents(record.unit_price_cents),
            total: Money::from_cents(record.total_cents),
        }
    }
}

const INVOICE_COLUMNS: &str = "i.id, i.customer_id, i.number, i.date, i.due_date, i.status, \
                               i.total_cents, i.created_at, i.updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.invoices();
///
/// let invoice = repo.get_by_id("uuid-here").await?;
/// let taken = repo.get_by_number("INV-2024-001").await?.is_some();
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Lists invoices with their customer and items.
    ///
    /// ## Filter
    /// - `search`: substring of the invoice number or customer name
    /// - `status`, `customer_id`: exact match
    /// - ordered by `sort_by` / `sort_order` (whitelisted columns only)
    pub async fn list(&self, filter: &InvoiceFilter) -> DbResult<Vec<InvoiceWithRelations>> {
        debug!(?filter, "Listing invoices");

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM invoices i JOIN customers c ON c.id = i.customer_id WHERE 1 = 1",
            INVOICE_COLUMNS
        ));

        if let Some(search) = &filter.search {
            let pattern = contains_pattern(search);
            query
                .push(" AND (i.number LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR c.name LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if let Some(status) = filter.status {
            query.push(" AND i.status = ").push_bind(status);
        }

        if let Some(customer_id) = &filter.customer_id {
            query.push(" AND i.customer_id = ").push_bind(customer_id.clone());
        }

        let direction = filter.sort_order.as_sql();
        query.push(format!(
            " ORDER BY i.{} {}, i.rowid {}",
            filter.sort_by.column(),
            direction,
            direction
        ));

        let records = query
            .build_query_as::<InvoiceRecord>()
            .fetch_all(&self.pool)
            .await?;

        let invoices = self.attach_relations(records).await?;
        debug!(count = invoices.len(), "Invoice list returned");
        Ok(invoices)
    }

    /// Gets a fully resolved invoice by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(InvoiceWithRelations))` - Invoice found
    /// * `Ok(None)` - Invoice not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<InvoiceWithRelations>> {
        let record = sqlx::query_as::<_, InvoiceRecord>(&format!(
            "SELECT {} FROM invoices i WHERE i.id = ?1",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(self.attach_relations(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Gets an invoice header by its human-assigned number.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<Invoice>> {
        let record = sqlx::query_as::<_, InvoiceRecord>(&format!(
            "SELECT {} FROM invoices i WHERE i.number = ?1",
            INVOICE_COLUMNS
        ))
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Invoice::from))
    }

    /// Lists a customer's invoice headers, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Invoice>> {
        let records = sqlx::query_as::<_, InvoiceRecord>(&format!(
            "SELECT {} FROM invoices i WHERE i.customer_id = ?1 \
             ORDER BY i.created_at DESC, i.rowid DESC",
            INVOICE_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Invoice::from).collect())
    }

    /// Creates an invoice and its items in one transaction.
    ///
    /// Status defaults to DRAFT.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` on `invoices.number` - number taken
    /// * `DbError::ForeignKeyViolation` - customer vanished
    pub async fn create(&self, dto: &CreateInvoice) -> DbResult<InvoiceWithRelations> {
        let id = new_id();
        let now = Utc::now();

        debug!(id = %id, number = %dto.number, items = dto.items.len(), "Creating invoice");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, customer_id, number, date, due_date, status,
                total_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&dto.customer_id)
        .bind(dto.number.trim())
        .bind(dto.date)
        .bind(dto.due_date)
        .bind(dto.status.unwrap_or_default())
        .bind(dto.total_amount.cents())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &dto.items).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", &id))
    }

    /// Applies a partial update in one transaction.
    ///
    /// Absent header fields keep their stored value. Present `items`
    /// replace the stored set wholesale.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no invoice with this ID
    /// * `DbError::UniqueViolation` on `invoices.number` - number taken
    pub async fn update(&self, id: &str, dto: &UpdateInvoice) -> DbResult<InvoiceWithRelations> {
        debug!(
            id = %id,
            replace_items = dto.items.is_some(),
            "Updating invoice"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                customer_id = COALESCE(?1, customer_id),
                number = COALESCE(?2, number),
                date = COALESCE(?3, date),
                due_date = COALESCE(?4, due_date),
                status = COALESCE(?5, status),
                total_cents = COALESCE(?6, total_cents),
                updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(&dto.customer_id)
        .bind(dto.number.as_deref().map(str::trim))
        .bind(dto.date)
        .bind(dto.due_date)
        .bind(dto.status)
        .bind(dto.total_amount.map(|amount| amount.cents()))
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        if let Some(items) = &dto.items {
            sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_items(&mut tx, id, items).await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))
    }

    /// Deletes an invoice; its items go with it (`ON DELETE CASCADE`).
    ///
    /// ## Errors
    /// `DbError::NotFound` - no invoice with this ID (also on a repeat delete)
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting invoice");

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Loads customers and items for a batch of headers, two queries total,
    /// preserving the order of `records`.
    async fn attach_relations(
        &self,
        records: Vec<InvoiceRecord>,
    ) -> DbResult<Vec<InvoiceWithRelations>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut customer_query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, name, email, tax_number, address, created_at, updated_at \
             FROM customers WHERE id IN (",
        );
        let mut separated = customer_query.separated(", ");
        for record in &records {
            separated.push_bind(record.customer_id.clone());
        }
        separated.push_unseparated(")");

        let customers: HashMap<String, Customer> = customer_query
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|customer| (customer.id.clone(), customer))
            .collect();

        let mut item_query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, invoice_id, description, quantity, unit_price_cents, total_cents \
             FROM invoice_items WHERE invoice_id IN (",
        );
        let mut separated = item_query.separated(", ");
        for record in &records {
            separated.push_bind(record.id.clone());
        }
        separated.push_unseparated(") ORDER BY invoice_id, position");

        let mut items: HashMap<String, Vec<InvoiceItem>> = HashMap::new();
        for item in item_query
            .build_query_as::<InvoiceItemRecord>()
            .fetch_all(&self.pool)
            .await?
        {
            items
                .entry(item.invoice_id.clone())
                .or_default()
                .push(InvoiceItem::from(item));
        }

        records
            .into_iter()
            .map(|record| {
                let customer = customers
                    .get(&record.customer_id)
                    .cloned()
                    .ok_or_else(|| DbError::not_found("Customer", &record.customer_id))?;
                let items = items.remove(&record.id).unwrap_or_default();

                Ok(InvoiceWithRelations {
                    invoice: Invoice::from(record),
                    customer,
                    items,
                })
            })
            .collect()
    }
}

/// Inserts `items` for `invoice_id`, numbering positions from zero.
async fn insert_items(
    conn: &mut SqliteConnection,
    invoice_id: &str,
    items: &[InvoiceItemInput],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, position, description, quantity,
                unit_price_cents, total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(new_id())
        .bind(invoice_id)
        .bind(position as i64)
        .bind(item.description.trim())
        .bind(item.quantity)
        .bind(item.unit_price.cents())
        .bind(item.total.cents())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
