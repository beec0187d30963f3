//! # Ledgerly API
//!
//! REST server for customers, invoices, PDF export and authentication.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Server                                    │
//! │                                                                         │
//! │  Browser ──► axum Router ──► routes/* ──► services/* ──► invoice-db    │
//! │                  │                             │                        │
//! │            TraceLayer, CORS           invoice-core validation           │
//! │                                       invoice-pdf rendering             │
//! │                                                                         │
//! │  Errors: every handler returns ApiResult<T>; ApiError renders           │
//! │  { "error", "code", "details"? } with the matching status               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::AppConfig`]):
//! - `DATABASE_URL` - SQLite connection string (default: sqlite://invoices.db)
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `HOST` / `PORT` - Listen address (default: 0.0.0.0:3000)
//! - `JWT_SECRET` - Secret for token signing
//! - `JWT_EXPIRY_SECS` - Token lifetime (default: 604800)

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::JwtManager;
use crate::services::{AuthService, CustomerService, InvoiceService};
use invoice_db::Database;

// Re-exports
pub use config::AppConfig;
pub use error::{ApiError, ApiResult, AuthError, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub customers: CustomerService,
    pub invoices: InvoiceService,
    pub auth: AuthService,
}

impl AppState {
    /// Wires every service to the one database handle.
    pub fn new(db: Database, config: &AppConfig) -> Self {
        AppState {
            customers: CustomerService::new(db.clone()),
            invoices: InvoiceService::new(db.clone()),
            auth: AuthService::new(
                db.clone(),
                JwtManager::new(&config.jwt_secret, config.jwt_expiry_secs),
            ),
            db,
        }
    }
}

/// Builds the full router with tracing and CORS applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::auth::routes(state.clone()))
        .merge(routes::customers::routes())
        .merge(routes::invoices::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
