use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub mod dashboard;

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route("/api/assistant-data", get(dashboard::get_assistant_data))
        .route("/health", get(health))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}
