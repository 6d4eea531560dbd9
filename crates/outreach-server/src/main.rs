//! outreach-server — webhook server for the outreach dashboard.
//!
//! Configuration is read from the environment (and `.env` when present); see
//! [`outreach_server::config`].

use std::sync::Arc;

use anyhow::Context;
use outreach_core::report::JsonDeckRenderer;
use outreach_core::{CommandService, JsonFileStore, SchemaRegistry};
use outreach_server::config::HubConfig;
use outreach_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,outreach_server=debug,outreach_core=debug".into()),
        )
        .init();

    let config = HubConfig::from_env();
    tracing::info!(
        workbook = %config.workbook_path.display(),
        decks = %config.deck_dir.display(),
        pipeline_tab = %config.sheets.pipeline_tab,
        action_tab = %config.sheets.action_items_tab,
        "starting outreach hub"
    );

    let store = JsonFileStore::open(&config.workbook_path).await?;
    let service = Arc::new(CommandService::new(
        Arc::new(store),
        Arc::new(SchemaRegistry::new(&config.sheets)),
        Arc::new(JsonDeckRenderer::new(&config.deck_dir)),
    ));

    let app = build_router(service);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("outreach-server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
