//! POST /, POST /exec — webhook entry point.
//!
//! The body is read as raw bytes: the dashboard posts JSON with a
//! `text/plain` content type to avoid a CORS preflight. The response is
//! always HTTP 200 with a `{success, ...}` envelope, failures included.

use std::sync::Arc;

use axum::body::Bytes;
use axum::{Extension, Json};
use outreach_core::{CommandService, Envelope};

pub async fn webhook(
    Extension(service): Extension<Arc<CommandService>>,
    body: Bytes,
) -> Json<Envelope> {
    Json(service.handle_bytes(&body).await)
}
