use axum::Router;
use std::sync::Arc;
use tower_http::compression::predicate::SizeAbove;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod cache;
pub mod cache_key;
pub mod cache_ttl;
pub mod engine;
pub mod error;
pub mod format;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;

use state::AppState;

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_router())
        .with_state(app_state)
        .layer(
            CompressionLayer::new()
                .gzip(true)
                .compress_when(SizeAbove::new(1024)), // reports are chart-heavy JSON
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
