//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// Always 200 while the process serves; `database` reports pool health.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = if state.db.health_check().await {
        "ok"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
