//! Router construction for the outreach hub server.

use std::sync::Arc;

use axum::{
    routing::get,
    Extension, Router,
};
use outreach_core::CommandService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;

/// Build the full axum router with all routes and middleware.
///
/// The webhook is mounted on both `/` and `/exec` so dashboards pointed at
/// either form of the deployment URL keep working.
pub fn build_router(service: Arc<CommandService>) -> Router {
    Router::new()
        .route("/", get(handlers::status::status).post(handlers::webhook::webhook))
        .route(
            "/exec",
            get(handlers::status::status).post(handlers::webhook::webhook),
        )
        .route("/health", get(handlers::status::health))
        .route("/health/sheets", get(handlers::status::sheets))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(Extension(service))
}
