//! Customer routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::AppJson;
use crate::error::ApiResult;
use crate::AppState;
use invoice_core::{CreateCustomer, Customer, CustomerWithInvoices, UpdateCustomer};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerListQuery {
    pub search: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route(
            "/api/customers/{id}",
            get(show).put(update).delete(remove),
        )
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<AppJson<Vec<Customer>>> {
    Ok(AppJson(state.customers.list(query.search.as_deref()).await?))
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AppJson<CustomerWithInvoices>> {
    Ok(AppJson(state.customers.get(&id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    AppJson(dto): AppJson<CreateCustomer>,
) -> ApiResult<(StatusCode, AppJson<Customer>)> {
    let customer = state.customers.create(dto).await?;
    Ok((StatusCode::CREATED, AppJson(customer)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateCustomer>,
) -> ApiResult<AppJson<Customer>> {
    Ok(AppJson(state.customers.update(&id, dto).await?))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.customers.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
