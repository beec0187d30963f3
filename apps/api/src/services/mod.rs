//! Service layer.
//!
//! Each service reads what the validation engine needs, asks the engine,
//! and writes only when it agrees. Storage uniqueness constraints still
//! have the last word: a violation that slips past the pre-check is
//! reported as the same domain conflict.

pub mod auth_service;
pub mod customer_service;
pub mod invoice_service;

pub use auth_service::AuthService;
pub use customer_service::CustomerService;
pub use invoice_service::InvoiceService;
