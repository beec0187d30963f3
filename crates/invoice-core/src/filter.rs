//! # List Filters
//!
//! Structured filters for the list endpoints, validated at the HTTP
//! boundary before anything reaches storage.
//!
//! ## Flow
//! ```text
//! GET /api/invoices?status=PAID&sortBy=dueDate&sortOrder=asc
//!      │
//!      ▼
//! InvoiceListParams   (raw strings, straight from the query)
//!      │  InvoiceFilter::from_params
//!      ▼
//! InvoiceFilter       (closed enums, no free-form column names)
//!      │
//!      ▼
//! InvoiceRepository::list
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::InvoiceStatus;
use crate::validation::{validate_search_query, ValidationResult};

/// Raw query parameters of `GET /api/invoices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Column an invoice list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvoiceSortField {
    Number,
    Date,
    DueDate,
    Status,
    TotalAmount,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl InvoiceSortField {
    const ALL: [InvoiceSortField; 7] = [
        InvoiceSortField::Number,
        InvoiceSortField::Date,
        InvoiceSortField::DueDate,
        InvoiceSortField::Status,
        InvoiceSortField::TotalAmount,
        InvoiceSortField::CreatedAt,
        InvoiceSortField::UpdatedAt,
    ];

    /// Query-string spelling.
    pub const fn as_param(&self) -> &'static str {
        match self {
            InvoiceSortField::Number => "number",
            InvoiceSortField::Date => "date",
            InvoiceSortField::DueDate => "dueDate",
            InvoiceSortField::Status => "status",
            InvoiceSortField::TotalAmount => "totalAmount",
            InvoiceSortField::CreatedAt => "createdAt",
            InvoiceSortField::UpdatedAt => "updatedAt",
        }
    }

    /// Storage column. Only these strings ever reach an ORDER BY clause.
    pub const fn column(&self) -> &'static str {
        match self {
            InvoiceSortField::Number => "number",
            InvoiceSortField::Date => "date",
            InvoiceSortField::DueDate => "due_date",
            InvoiceSortField::Status => "status",
            InvoiceSortField::TotalAmount => "total_cents",
            InvoiceSortField::CreatedAt => "created_at",
            InvoiceSortField::UpdatedAt => "updated_at",
        }
    }

    fn parse(raw: &str) -> ValidationResult<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_param() == raw)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sortBy".to_string(),
                allowed: Self::ALL
                    .iter()
                    .map(|field| field.as_param().to_string())
                    .collect(),
            })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn parse(raw: &str) -> ValidationResult<Self> {
        match raw {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sortOrder".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

/// Validated invoice list filter.
///
/// Defaults to every invoice, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Case-insensitive substring of the invoice number or customer name.
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<String>,
    pub sort_by: InvoiceSortField,
    pub sort_order: SortOrder,
}

impl InvoiceFilter {
    /// Validates raw query parameters.
    ///
    /// Empty strings count as absent, matching what browser forms send for
    /// untouched inputs. Unknown status, sort field or order values fail.
    pub fn from_params(params: InvoiceListParams) -> ValidationResult<Self> {
        let search = non_empty(params.search)
            .map(|s| validate_search_query(&s))
            .transpose()?
            .filter(|s| !s.is_empty());

        let status = non_empty(params.status)
            .map(|s| s.parse::<InvoiceStatus>())
            .transpose()?;

        let sort_by = non_empty(params.sort_by)
            .map(|s| InvoiceSortField::parse(&s))
            .transpose()?
            .unwrap_or_default();

        let sort_order = non_empty(params.sort_order)
            .map(|s| SortOrder::parse(&s))
            .transpose()?
            .unwrap_or_default();

        Ok(InvoiceFilter {
            search,
            status,
            customer_id: non_empty(params.customer_id),
            sort_by,
            sort_order,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_created_at_desc() {
        let filter = InvoiceFilter::from_params(InvoiceListParams::default()).unwrap();
        assert_eq!(filter.sort_by, InvoiceSortField::CreatedAt);
        assert_eq!(filter.sort_order, SortOrder::Desc);
        assert!(filter.search.is_none());
        assert!(filter.status.is_none());
    }

    #[test]
    fn test_parses_all_params() {
        let params = InvoiceListParams {
            search: Some("  acme ".to_string()),
            status: Some("PAID".to_string()),
            customer_id: Some("c-1".to_string()),
            sort_by: Some("dueDate".to_string()),
            sort_order: Some("asc".to_string()),
        };

        let filter = InvoiceFilter::from_params(params).unwrap();
        assert_eq!(filter.search.as_deref(), Some("acme"));
        assert_eq!(filter.status, Some(InvoiceStatus::Paid));
        assert_eq!(filter.customer_id.as_deref(), Some("c-1"));
        assert_eq!(filter.sort_by.column(), "due_date");
        assert_eq!(filter.sort_order.as_sql(), "ASC");
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let params = InvoiceListParams {
            search: Some(String::new()),
            status: Some(String::new()),
            customer_id: Some(" ".to_string()),
            sort_by: Some(String::new()),
            sort_order: Some(String::new()),
        };

        let filter = InvoiceFilter::from_params(params).unwrap();
        assert_eq!(filter, InvoiceFilter::default());
    }

    #[test]
    fn test_rejects_unknown_values() {
        let bad_sort = InvoiceListParams {
            sort_by: Some("customer_id; DROP TABLE invoices".to_string()),
            ..Default::default()
        };
        assert!(InvoiceFilter::from_params(bad_sort).is_err());

        let bad_status = InvoiceListParams {
            status: Some("ARCHIVED".to_string()),
            ..Default::default()
        };
        assert!(InvoiceFilter::from_params(bad_status).is_err());

        let bad_order = InvoiceListParams {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(InvoiceFilter::from_params(bad_order).is_err());
    }
}
