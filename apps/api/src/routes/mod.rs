//! HTTP routes.
//!
//! ## Surface
//! ```text
//! GET    /health
//! POST   /api/auth/register          POST /api/auth/login
//! GET    /api/auth/me                (bearer token required)
//! GET    /api/customers              POST /api/customers
//! GET    /api/customers/{id}         PUT  /api/customers/{id}    DELETE
//! GET    /api/invoices               POST /api/invoices
//! GET    /api/invoices/{id}          PUT  /api/invoices/{id}     DELETE
//! GET    /api/invoices/{id}/pdf
//! ```
//!
//! Only `/api/auth/me` sits behind the bearer check. Customer and invoice
//! routes are open; put them behind [`auth::require_auth`] before exposing
//! the server beyond a trusted network.

pub mod auth;
pub mod customers;
pub mod health;
pub mod invoices;

use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ApiError;

/// `Json` whose rejections become [`ApiError`] bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
