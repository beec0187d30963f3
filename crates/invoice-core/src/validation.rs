//! # Validation & Consistency Engine
//!
//! Pure decision functions that enforce customer and invoice invariants
//! before any mutation reaches storage.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (apps/api)                                     │
//! │  ├── JSON shape (serde), query filters (InvoiceFilter)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services fetch what the rules need, then call                │
//! │  └── THIS MODULE: field shape + business rules, no I/O                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (customers.email, invoices.number, users.email)            │
//! │  └── Foreign keys (invoice → customer, item → invoice)                 │
//! │                                                                         │
//! │  The uniqueness checks here are early, friendly rejections. Storage    │
//! │  constraints are the final arbiter under concurrent writes.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invoice Rule Order
//! ```text
//! customer exists? ──no──► CustomerNotFound
//!      │
//! number free? ─────no──► DuplicateNumber
//!      │
//! items non-empty? ─no──► EmptyItems
//!      │
//! item fields ok? ──no──► Validation
//!      │
//! |Σ total − declared| ≤ $0.01? ──no──► TotalMismatch
//!      │
//!      ▼
//!     Ok
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    CreateCustomer, CreateInvoice, Customer, Invoice, InvoiceItem, InvoiceItemInput,
    InvoiceWithRelations, UpdateCustomer, UpdateInvoice,
};
use crate::{MIN_PASSWORD_LENGTH, TOTAL_TOLERANCE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a customer or user display name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates that an email is RFC-shaped.
///
/// ## Rules
/// - No whitespace
/// - Exactly one `@` with a non-empty local part
/// - Domain has at least two non-empty dot-separated labels
///
/// ## Example
/// ```rust
/// use invoice_core::validation::validate_email;
///
/// assert!(validate_email("contact@acme.com").is_ok());
/// assert!(validate_email("contact@acme").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must have the form name@domain.tld"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("must have the form name@domain.tld"));
    }

    Ok(())
}

/// Validates a password on registration.
///
/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a human-assigned invoice number.
pub fn validate_invoice_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "number".to_string(),
        });
    }

    if number.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "number".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates one submitted line item.
///
/// ## Rules
/// - Description must not be blank
/// - Quantity must be positive
/// - Unit price must not be negative
///
/// The line total is deliberately not recomputed here; it is reconciled
/// against the invoice total by [`check_total`].
pub fn validate_item(index: usize, item: &InvoiceItemInput) -> ValidationResult<()> {
    if item.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: format!("items[{}].description", index),
        });
    }

    if item.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: format!("items[{}].quantity", index),
        });
    }

    if item.unit_price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: format!("items[{}].unitPrice", index),
        });
    }

    Ok(())
}

// =============================================================================
// Total Consistency
// =============================================================================

/// Checks a declared total against a sum of line totals.
///
/// ## Tolerance
/// Absolute, one cent, inclusive: a difference of exactly $0.01 passes and
/// $0.02 fails. Both sides are exact integer cents, so there is no drift.
///
/// ## Errors
/// `ValidationError::InvalidFormat` on `items` when the line totals, or their
/// difference from the declared total, do not fit in an `i64` of cents.
pub fn check_total(line_totals: impl IntoIterator<Item = Money>, declared: Money) -> CoreResult<()> {
    let out_of_range = || ValidationError::InvalidFormat {
        field: "items".to_string(),
        reason: "line totals are out of range".to_string(),
    };

    let calculated = Money::checked_sum(line_totals).ok_or_else(out_of_range)?;
    let difference = calculated.checked_sub(declared).ok_or_else(out_of_range)?;

    if difference.abs() > TOTAL_TOLERANCE {
        return Err(CoreError::TotalMismatch {
            declared,
            calculated,
        });
    }

    Ok(())
}

fn validate_items(items: &[InvoiceItemInput]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyItems);
    }

    for (index, item) in items.iter().enumerate() {
        validate_item(index, item)?;
    }

    Ok(())
}

// =============================================================================
// Customer Rules
// =============================================================================

/// Decides whether a new customer may be created.
///
/// `existing_by_email` is the customer (if any) already holding the
/// candidate's email.
pub fn validate_new_customer(
    candidate: &CreateCustomer,
    existing_by_email: Option<&Customer>,
) -> CoreResult<()> {
    validate_name(&candidate.name)?;
    validate_email(&candidate.email)?;

    if existing_by_email.is_some() {
        return Err(CoreError::DuplicateEmail);
    }

    Ok(())
}

/// Decides whether customer `id` may be updated with `candidate`.
///
/// ## Rules
/// - `existing_by_id` absent → `CustomerNotFound`
/// - present fields must be well-formed
/// - `existing_by_email` owned by a different customer → `EmailInUse`
///   (keeping one's own email is fine)
pub fn validate_customer_update(
    id: &str,
    candidate: &UpdateCustomer,
    existing_by_id: Option<&Customer>,
    existing_by_email: Option<&Customer>,
) -> CoreResult<()> {
    if existing_by_id.is_none() {
        return Err(CoreError::CustomerNotFound);
    }

    if let Some(name) = &candidate.name {
        validate_name(name)?;
    }

    if let Some(email) = &candidate.email {
        validate_email(email)?;

        if existing_by_email.is_some_and(|owner| owner.id != id) {
            return Err(CoreError::EmailInUse);
        }
    }

    Ok(())
}

/// Checks whether a customer can be removed.
///
/// Customers with invoices are kept; their invoices must go first.
pub fn validate_customer_delete(
    existing_by_id: Option<&Customer>,
    invoice_count: i64,
) -> CoreResult<()> {
    if existing_by_id.is_none() {
        return Err(CoreError::CustomerNotFound);
    }

    if invoice_count > 0 {
        return Err(CoreError::CustomerHasInvoices { invoice_count });
    }

    Ok(())
}

// =============================================================================
// Invoice Rules
// =============================================================================

/// Decides whether a new invoice may be created.
///
/// ## Arguments
/// * `customer_lookup` - the customer named by `candidate.customer_id`, if found
/// * `number_lookup` - the invoice already carrying `candidate.number`, if any
pub fn validate_new_invoice(
    candidate: &CreateInvoice,
    customer_lookup: Option<&Customer>,
    number_lookup: Option<&Invoice>,
) -> CoreResult<()> {
    if customer_lookup.is_none() {
        return Err(CoreError::CustomerNotFound);
    }

    validate_invoice_number(&candidate.number)?;

    if number_lookup.is_some() {
        return Err(CoreError::DuplicateNumber);
    }

    validate_items(&candidate.items)?;

    check_total(
        candidate.items.iter().map(|item| item.total),
        candidate.total_amount,
    )
}

/// Decides whether an existing invoice may be updated with `candidate`.
///
/// ## Arguments
/// * `existing` - the invoice being updated, if found
/// * `customer_lookup` - consulted only when `candidate.customer_id` is set
/// * `number_lookup` - consulted only when `candidate.number` is set; the
///   invoice's own current number is not a conflict
///
/// ## Amount Rule
/// ```text
/// items   total     checked against
/// ─────   ───────   ───────────────────────────────
/// new     new       new items  vs new total
/// new     absent    new items  vs stored total
/// absent  new       stored items vs new total
/// absent  absent    (nothing, e.g. status-only update)
/// ```
/// Whatever is written, the stored invoice still satisfies the total rule.
pub fn validate_invoice_update(
    candidate: &UpdateInvoice,
    existing: Option<&InvoiceWithRelations>,
    customer_lookup: Option<&Customer>,
    number_lookup: Option<&Invoice>,
) -> CoreResult<()> {
    let existing = existing.ok_or(CoreError::InvoiceNotFound)?;

    if candidate.customer_id.is_some() && customer_lookup.is_none() {
        return Err(CoreError::CustomerNotFound);
    }

    if let Some(number) = &candidate.number {
        validate_invoice_number(number)?;

        if number_lookup.is_some_and(|owner| owner.id != existing.invoice.id) {
            return Err(CoreError::DuplicateNumber);
        }
    }

    if let Some(items) = &candidate.items {
        validate_items(items)?;
    }

    if !candidate.touches_amounts() {
        return Ok(());
    }

    let declared = candidate
        .total_amount
        .unwrap_or(existing.invoice.total_amount);

    match &candidate.items {
        Some(items) => check_total(items.iter().map(|item| item.total), declared),
        None => check_total(existing.items.iter().map(|item: &InvoiceItem| item.total), declared),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InvoiceStatus;
    use chrono::Utc;

    fn customer(id: &str, email: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: id.to_string(),
            name: "Acme Corporation".to_string(),
            email: email.to_string(),
            tax_number: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(total_cents: i64) -> InvoiceItemInput {
        InvoiceItemInput {
            description: "Consulting".to_string(),
            quantity: 1,
            unit_price: Money::from_cents(total_cents),
            total: Money::from_cents(total_cents),
        }
    }

    fn new_invoice(items: Vec<InvoiceItemInput>, total_cents: i64) -> CreateInvoice {
        CreateInvoice {
            customer_id: "c-1".to_string(),
            number: "INV-2024-001".to_string(),
            date: Utc::now(),
            due_date: Utc::now(),
            status: None,
            total_amount: Money::from_cents(total_cents),
            items,
        }
    }

    fn stored_invoice(id: &str, number: &str, item_totals: &[i64]) -> InvoiceWithRelations {
        let now = Utc::now();
        let total: i64 = item_totals.iter().sum();
        InvoiceWithRelations {
            invoice: Invoice {
                id: id.to_string(),
                customer_id: "c-1".to_string(),
                number: number.to_string(),
                date: now,
                due_date: now,
                status: InvoiceStatus::Draft,
                total_amount: Money::from_cents(total),
                created_at: now,
                updated_at: now,
            },
            customer: customer("c-1", "contact@acme.com"),
            items: item_totals
                .iter()
                .enumerate()
                .map(|(i, cents)| InvoiceItem {
                    id: format!("item-{}", i),
                    invoice_id: id.to_string(),
                    description: "Consulting".to_string(),
                    quantity: 1,
                    unit_price: Money::from_cents(*cents),
                    total: Money::from_cents(*cents),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("contact@acme.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("a@b@acme.com").is_err());
        assert!(validate_email("contact@acme").is_err());
        assert!(validate_email("contact@.com").is_err());
        assert!(validate_email("con tact@acme.com").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_check_total_tolerance_is_one_cent_inclusive() {
        let lines = [Money::from_cents(100_000), Money::from_cents(50_000)];

        assert!(check_total(lines, Money::from_cents(150_000)).is_ok());
        assert!(check_total(lines, Money::from_cents(150_001)).is_ok());
        assert!(check_total(lines, Money::from_cents(149_999)).is_ok());

        let err = check_total(lines, Money::from_cents(150_002)).unwrap_err();
        match err {
            CoreError::TotalMismatch {
                declared,
                calculated,
            } => {
                assert_eq!(declared.cents(), 150_002);
                assert_eq!(calculated.cents(), 150_000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_total_rejects_overflowing_line_totals() {
        let item: InvoiceItemInput = serde_json::from_value(serde_json::json!({
            "description": "Huge",
            "quantity": 1,
            "unitPrice": 1,
            "total": 92_233_720_368_547_758_i64,
        }))
        .unwrap();
        let items = vec![item.clone(), item];

        let err = check_total(items.iter().map(|item| item.total), Money::from_cents(0))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "items"
        ));

        let err = check_total([Money::from_cents(i64::MIN)], Money::from_cents(1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_new_customer_rules() {
        let candidate = CreateCustomer {
            name: "Acme Corporation".to_string(),
            email: "contact@acme.com".to_string(),
            tax_number: None,
            address: None,
        };
        assert!(validate_new_customer(&candidate, None).is_ok());

        let taken = customer("c-1", "contact@acme.com");
        assert!(matches!(
            validate_new_customer(&candidate, Some(&taken)),
            Err(CoreError::DuplicateEmail)
        ));

        let blank = CreateCustomer {
            name: "  ".to_string(),
            ..candidate
        };
        assert!(matches!(
            validate_new_customer(&blank, None),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_customer_update_rules() {
        let me = customer("c-1", "contact@acme.com");
        let other = customer("c-2", "info@tech.com");

        let to_other_email = UpdateCustomer {
            email: Some("info@tech.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_customer_update("c-1", &to_other_email, Some(&me), Some(&other)),
            Err(CoreError::EmailInUse)
        ));

        let to_own_email = UpdateCustomer {
            email: Some("contact@acme.com".to_string()),
            ..Default::default()
        };
        assert!(validate_customer_update("c-1", &to_own_email, Some(&me), Some(&me)).is_ok());

        assert!(matches!(
            validate_customer_update("missing", &to_own_email, None, None),
            Err(CoreError::CustomerNotFound)
        ));
    }

    #[test]
    fn test_customer_delete_blocked_by_invoices() {
        let me = customer("c-1", "contact@acme.com");
        assert!(validate_customer_delete(Some(&me), 0).is_ok());
        assert!(matches!(
            validate_customer_delete(Some(&me), 2),
            Err(CoreError::CustomerHasInvoices { invoice_count: 2 })
        ));
        assert!(matches!(
            validate_customer_delete(None, 0),
            Err(CoreError::CustomerNotFound)
        ));
    }

    #[test]
    fn test_new_invoice_rule_order() {
        let acme = customer("c-1", "contact@acme.com");
        let taken = stored_invoice("i-1", "INV-2024-001", &[100]);

        // Customer is checked before anything else
        let empty = new_invoice(vec![], 0);
        assert!(matches!(
            validate_new_invoice(&empty, None, Some(&taken.invoice)),
            Err(CoreError::CustomerNotFound)
        ));

        // Then number uniqueness, even with no items
        assert!(matches!(
            validate_new_invoice(&empty, Some(&acme), Some(&taken.invoice)),
            Err(CoreError::DuplicateNumber)
        ));

        assert!(matches!(
            validate_new_invoice(&empty, Some(&acme), None),
            Err(CoreError::EmptyItems)
        ));

        let mismatched = new_invoice(vec![item(100_000), item(50_000)], 150_500);
        assert!(matches!(
            validate_new_invoice(&mismatched, Some(&acme), None),
            Err(CoreError::TotalMismatch { .. })
        ));

        let good = new_invoice(vec![item(100_000), item(50_000)], 150_000);
        assert!(validate_new_invoice(&good, Some(&acme), None).is_ok());
    }

    #[test]
    fn test_new_invoice_item_fields() {
        let acme = customer("c-1", "contact@acme.com");

        let mut zero_qty = item(100);
        zero_qty.quantity = 0;
        let candidate = new_invoice(vec![zero_qty], 100);
        assert!(matches!(
            validate_new_invoice(&candidate, Some(&acme), None),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let mut negative_price = item(0);
        negative_price.unit_price = Money::from_cents(-1);
        let candidate = new_invoice(vec![negative_price], 0);
        assert!(matches!(
            validate_new_invoice(&candidate, Some(&acme), None),
            Err(CoreError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));
    }

    #[test]
    fn test_invoice_update_status_only_skips_amount_checks() {
        let existing = stored_invoice("i-1", "INV-1", &[100_000, 50_000]);
        let candidate = UpdateInvoice {
            status: Some(InvoiceStatus::Sent),
            ..Default::default()
        };
        assert!(validate_invoice_update(&candidate, Some(&existing), None, None).is_ok());
    }

    #[test]
    fn test_invoice_update_not_found_first() {
        let candidate = UpdateInvoice {
            items: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&candidate, None, None, None),
            Err(CoreError::InvoiceNotFound)
        ));
    }

    #[test]
    fn test_invoice_update_number_rules() {
        let existing = stored_invoice("i-1", "INV-1", &[100]);
        let other = stored_invoice("i-2", "INV-2", &[100]);

        let keep_own = UpdateInvoice {
            number: Some("INV-1".to_string()),
            ..Default::default()
        };
        assert!(
            validate_invoice_update(&keep_own, Some(&existing), None, Some(&existing.invoice))
                .is_ok()
        );

        let steal = UpdateInvoice {
            number: Some("INV-2".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&steal, Some(&existing), None, Some(&other.invoice)),
            Err(CoreError::DuplicateNumber)
        ));
    }

    #[test]
    fn test_invoice_update_customer_must_exist() {
        let existing = stored_invoice("i-1", "INV-1", &[100]);
        let candidate = UpdateInvoice {
            customer_id: Some("missing".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&candidate, Some(&existing), None, None),
            Err(CoreError::CustomerNotFound)
        ));
    }

    #[test]
    fn test_invoice_update_amount_matrix() {
        let existing = stored_invoice("i-1", "INV-1", &[100_000, 50_000]);

        // New items and new total that agree
        let both = UpdateInvoice {
            items: Some(vec![item(20_000)]),
            total_amount: Some(Money::from_cents(20_000)),
            ..Default::default()
        };
        assert!(validate_invoice_update(&both, Some(&existing), None, None).is_ok());

        // New items against the stored total of 1500.00
        let items_only = UpdateInvoice {
            items: Some(vec![item(20_000)]),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&items_only, Some(&existing), None, None),
            Err(CoreError::TotalMismatch { .. })
        ));

        // New total against the stored items
        let total_only = UpdateInvoice {
            total_amount: Some(Money::from_cents(150_001)),
            ..Default::default()
        };
        assert!(validate_invoice_update(&total_only, Some(&existing), None, None).is_ok());

        let bad_total_only = UpdateInvoice {
            total_amount: Some(Money::from_cents(99)),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&bad_total_only, Some(&existing), None, None),
            Err(CoreError::TotalMismatch { .. })
        ));

        let empty_items = UpdateInvoice {
            items: Some(vec![]),
            total_amount: Some(Money::zero()),
            ..Default::default()
        };
        assert!(matches!(
            validate_invoice_update(&empty_items, Some(&existing), None, None),
            Err(CoreError::EmptyItems)
        ));
    }
}
