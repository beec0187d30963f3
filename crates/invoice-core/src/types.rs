//! # Domain Types
//!
//! Core domain types used throughout the invoicing service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐ 1   * ┌─────────────────┐ 1   * ┌───────────────┐ │
//! │  │    Customer     │──────►│     Invoice     │──────►│  InvoiceItem  │ │
//! │  │  ─────────────  │       │  ─────────────  │       │ ───────────── │ │
//! │  │  id (UUID)      │       │  id (UUID)      │       │ id (UUID)     │ │
//! │  │  email (unique) │       │  number(unique) │       │ description   │ │
//! │  │  name           │       │  status         │       │ quantity      │ │
//! │  │  tax_number?    │       │  total_amount   │       │ unit_price    │ │
//! │  │  address?       │       │  date, due_date │       │ total         │ │
//! │  └─────────────────┘       └─────────────────┘       └───────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐       ┌─────────────────┐                         │
//! │  │      User       │       │  InvoiceStatus  │                         │
//! │  │  (auth only)    │       │  DRAFT / SENT   │                         │
//! │  │  email (unique) │       │  PAID/CANCELLED │                         │
//! │  └─────────────────┘       └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations and URLs
//! - Business key: (customer email, invoice number) - human-facing, unique

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

/// Generates a fresh entity identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle status of an invoice.
///
/// ## Intended Flow
/// ```text
/// DRAFT ──► SENT ──► PAID
///   │         │        │
///   └─────────┴────────┴──► CANCELLED
/// ```
/// The flow is advisory: any status may be written at any time.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Cancelled,
    ];

    /// Wire and storage spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: InvoiceStatus::ALL
                    .iter()
                    .map(|status| status.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A billable customer.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique across all customers (case-sensitive).
    pub email: String,
    pub tax_number: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Customer detail view: the customer plus its invoices, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerWithInvoices {
    #[serde(flatten)]
    pub customer: Customer,
    pub invoices: Vec<Invoice>,
}

/// Body of `POST /api/customers`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of `PUT /api/customers/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Invoice
// =============================================================================

/// Invoice header as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    /// Human-assigned, unique across all invoices.
    pub number: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    #[ts(as = "f64")]
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One billable row on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub description: String,
    pub quantity: i64,
    #[ts(as = "f64")]
    pub unit_price: Money,
    /// Caller-declared line total; validated through the invoice sum check.
    #[ts(as = "f64")]
    pub total: Money,
}

/// Fully resolved invoice: header, owning customer and ordered items.
///
/// This is the snapshot the PDF renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithRelations {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer: Customer,
    pub items: Vec<InvoiceItem>,
}

/// A line item as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemInput {
    pub description: String,
    pub quantity: i64,
    #[ts(as = "f64")]
    pub unit_price: Money,
    #[ts(as = "f64")]
    pub total: Money,
}

/// Body of `POST /api/invoices`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoice {
    pub customer_id: String,
    pub number: String,
    #[ts(as = "String")]
    #[serde(deserialize_with = "deserialize_date")]
    pub date: DateTime<Utc>,
    #[ts(as = "String")]
    #[serde(deserialize_with = "deserialize_date")]
    pub due_date: DateTime<Utc>,
    /// Defaults to DRAFT.
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[ts(as = "f64")]
    pub total_amount: Money,
    pub items: Vec<InvoiceItemInput>,
}

/// Body of `PUT /api/invoices/:id`. Absent fields are left unchanged;
/// a present `items` list replaces the existing items wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoice {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[ts(as = "Option<String>")]
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[ts(as = "Option<f64>")]
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub items: Option<Vec<InvoiceItemInput>>,
}

impl UpdateInvoice {
    /// True when the update touches items or the declared total.
    pub fn touches_amounts(&self) -> bool {
        self.items.is_some() || self.total_amount.is_some()
    }
}

// =============================================================================
// User
// =============================================================================

/// An account that can log in. Not related to customers or invoices.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User fields safe to return to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parses an invoice date from RFC 3339 (`2024-01-15T00:00:00.000Z`) or a
/// bare calendar date (`2024-01-15`, read as midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("'{}' is not an ISO 8601 date", raw),
        })
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date(&raw).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
