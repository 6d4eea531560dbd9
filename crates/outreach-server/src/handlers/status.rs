//! GET / — status probe, GET /health — liveness, GET /health/sheets — tab check.

use std::sync::Arc;

use axum::{Extension, Json};
use outreach_core::service::{StatusProbe, TableHealth};
use outreach_core::CommandService;
use serde_json::{json, Value};

pub async fn status(Extension(service): Extension<Arc<CommandService>>) -> Json<StatusProbe> {
    Json(service.status())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn sheets(
    Extension(service): Extension<Arc<CommandService>>,
) -> Json<Vec<TableHealth>> {
    Json(service.sheet_health().await)
}
