//! HTTP trigger: `GET /?q=TERM` runs one harvest and answers with the status line.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::sync::Mutex;

use flora_harvest::HarvestConfig;

#[derive(Debug, Deserialize)]
struct TriggerParams {
    #[serde(default)]
    q: Option<String>,
}

/// Shared state: the config plus a lock so only one harvest runs at a time.
struct ServerState {
    config: HarvestConfig,
    running: Mutex<()>,
}

/// Build the router; exposed for in-process tests.
pub fn router(config: HarvestConfig) -> Router {
    let state = Arc::new(ServerState {
        config,
        running: Mutex::new(()),
    });

    Router::new()
        .route("/", get(handle_trigger))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Serve the trigger on `addr` until the process exits.
pub async fn run(addr: &str, config: HarvestConfig) -> anyhow::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP trigger listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn handle_trigger(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<TriggerParams>,
) -> Response {
    let _guard = state.running.lock().await;

    match crate::commands::harvest(&state.config, params.q.as_deref()).await {
        Ok(status) => (StatusCode::OK, status).into_response(),
        Err(e) => {
            tracing::error!("Harvest failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("harvest failed: {e}")).into_response()
        }
    }
}

async fn handle_health() -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
