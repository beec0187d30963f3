//! # invoice-db: Database Layer for Invoicing
//!
//! SQLite storage for customers, invoices, line items and users, built on
//! sqlx with embedded migrations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Invoice Data Flow                                │
//! │                                                                         │
//! │  HTTP handler ──► Service (validation via invoice-core)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    invoice-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo   │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ InvoiceRepo    │   │ 0001_initial │  │   │
//! │  │   │               │    │ UserRepo       │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_URL, default sqlite://invoices.db)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use invoice_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("sqlite://invoices.db")).await?;
//! let customers = db.customers().list(Some("acme")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::user::UserRepository;
