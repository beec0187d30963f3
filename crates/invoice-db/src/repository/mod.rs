//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (apps/api)                                                    │
//! │       │                                                                 │
//! │       │  db.invoices().get_by_number("INV-2024-001")                   │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── list(&filter)                                                     │
//! │  ├── get_by_id(id) / get_by_number(number)                             │
//! │  ├── create(&dto) / update(id, &dto)   (one transaction each)          │
//! │  └── delete(id)                        (items cascade)                 │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories never decide business rules; they only read and write.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD and search
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices with items
//! - [`UserRepository`](user::UserRepository) - Login accounts

pub mod customer;
pub mod invoice;
pub mod user;

/// Builds a `LIKE` pattern matching `term` anywhere, with `\` as the
/// escape character for literal `%`, `_` and `\`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
