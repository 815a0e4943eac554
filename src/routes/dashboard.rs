//! Dashboard report endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::Result;
use crate::models::report::AggregatedReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Aggregated profitability report for the requested window (default:
/// trailing 30 days).
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<AggregatedReport>> {
    let report = state
        .engine
        .build_report(
            &state.credentials,
            &state.cost_overrides,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(report))
}

/// Same aggregate, served to the conversational assistant as grounding
/// context. Shares the engine and its cache; there is no second
/// aggregation path.
pub async fn get_assistant_data(
    state: State<Arc<AppState>>,
    query: Query<WindowQuery>,
) -> Result<Json<AggregatedReport>> {
    get_dashboard(state, query).await
}
