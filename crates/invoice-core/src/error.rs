//! # Error Types
//!
//! Domain-specific error types for invoice-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  invoice-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input shape failures                           │
//! │                                                                         │
//! │  invoice-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  invoice-pdf errors (separate crate)                                   │
//! │  └── RenderError      - Document encoding failures                     │
//! │                                                                         │
//! │  API errors (in apps/api)                                              │
//! │  └── ApiError         - What the browser client sees (JSON body)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → HTTP response          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every rule violation is its own variant, never a generic string
//! 3. The display text is the message the client shows to the user

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the validation engine and services.
///
/// ## HTTP Mapping (done in apps/api)
/// ```text
/// CustomerNotFound / InvoiceNotFound          → 404
/// DuplicateEmail / EmailInUse / DuplicateNumber → 400 (conflict)
/// EmptyItems / TotalMismatch / Validation      → 400 (validation)
/// CustomerHasInvoices                          → 400 (conflict)
/// ```
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced customer does not exist.
    #[error("Customer not found")]
    CustomerNotFound,

    /// Referenced invoice does not exist.
    #[error("Invoice not found")]
    InvoiceNotFound,

    /// A customer with this email already exists (create).
    #[error("Customer with this email already exists")]
    DuplicateEmail,

    /// Another customer already owns this email (update).
    #[error("Email is already in use by another customer")]
    EmailInUse,

    /// Another invoice already carries this number.
    #[error("Invoice number already exists")]
    DuplicateNumber,

    /// An invoice was submitted without line items.
    #[error("Invoice must have at least one item")]
    EmptyItems,

    /// Declared total differs from the sum of line totals by more than
    /// one cent.
    ///
    /// ## Example
    /// ```text
    /// items: 1000.00 + 500.00 = 1500.00
    /// totalAmount: 1500.02
    ///      │
    ///      ▼
    /// TotalMismatch { declared: $1500.02, calculated: $1500.00 }
    /// ```
    #[error("Total amount does not match sum of items")]
    TotalMismatch { declared: Money, calculated: Money },

    /// Customer still owns invoices and cannot be deleted.
    #[error("Cannot delete customer with existing invoices")]
    CustomerHasInvoices { invoice_count: i64 },

    /// Input validation failed (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a field has the wrong shape, before any business rule
/// is evaluated.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., malformed email, unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
