//! # invoice-core: Pure Business Logic for Invoicing
//!
//! This crate holds the domain types and the validation engine as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Service Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser Client                               │   │
//! │  │   Customers ──► Invoices ──► Invoice Detail ──► PDF download   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/api (routes → services)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ invoice-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  filter   │  │ validation│  │   │
//! │  │   │ Customer  │  │   Money   │  │ Invoice   │  │  engine   │  │   │
//! │  │   │ Invoice   │  │  (cents)  │  │ Filter    │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            invoice-db (SQLite)  /  invoice-pdf (printpdf)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types and request DTOs
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`filter`] - Validated list filters
//! - [`error`] - Domain error types
//! - [`validation`] - The validation & consistency engine
//!
//! ## Example Usage
//!
//! ```rust
//! use invoice_core::money::Money;
//! use invoice_core::validation::check_total;
//!
//! let lines = [Money::from_cents(100_000), Money::from_cents(50_000)];
//!
//! assert!(check_total(lines, Money::from_cents(150_001)).is_ok());
//! assert!(check_total(lines, Money::from_cents(150_002)).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{InvoiceFilter, InvoiceListParams, InvoiceSortField, SortOrder};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest allowed gap between the declared invoice total and the sum of
/// its line totals.
pub const TOTAL_TOLERANCE: Money = Money::from_cents(1);

/// Minimum password length on registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;
