//! Invoice routes, including the PDF download.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use super::AppJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use invoice_core::{CreateInvoice, InvoiceListParams, InvoiceWithRelations, UpdateInvoice};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/invoices", get(list).post(create))
        .route(
            "/api/invoices/{id}",
            get(show).put(update).delete(remove),
        )
        .route("/api/invoices/{id}/pdf", get(export_pdf))
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InvoiceListParams>,
) -> ApiResult<AppJson<Vec<InvoiceWithRelations>>> {
    Ok(AppJson(state.invoices.list(params).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AppJson<InvoiceWithRelations>> {
    Ok(AppJson(state.invoices.get(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(dto): AppJson<CreateInvoice>,
) -> ApiResult<(StatusCode, AppJson<InvoiceWithRelations>)> {
    let invoice = state.invoices.create(dto).await?;
    Ok((StatusCode::CREATED, AppJson(invoice)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateInvoice>,
) -> ApiResult<AppJson<InvoiceWithRelations>> {
    Ok(AppJson(state.invoices.update(&id, dto).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.invoices.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let (filename, bytes) = state.invoices.export_pdf(&id).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&filename))
        .map_err(|_| ApiError::internal("Failed to export invoice PDF"))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment; filename=...` for plain names. Anything else gets a quoted
/// ASCII fallback plus an RFC 5987 `filename*` with the UTF-8 name.
fn content_disposition(filename: &str) -> String {
    if !filename.is_empty() && filename.bytes().all(is_token_byte) {
        return format!("attachment; filename={}", filename);
    }

    let fallback: String = filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(filename.len() * 3);
    for byte in filename.bytes() {
        if is_attr_byte(byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$&'*+-.^_`|~".contains(&b)
}

fn is_attr_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b)
}
