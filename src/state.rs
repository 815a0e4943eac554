//! Shared application state: the composition root that wires the HTTP
//! client, the report cache backend, the platform endpoints, and the
//! account credential bundle into the aggregation engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client as ReqwestClient;
use tracing::warn;

use crate::cache::report_cache_from_env;
use crate::engine::DashboardEngine;
use crate::models::credentials::load_cost_overrides;
use crate::models::{AccountCredentials, CostOverrides};
use crate::services::PlatformEndpoints;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DashboardEngine>,
    pub credentials: AccountCredentials,
    pub cost_overrides: Arc<CostOverrides>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let report_cache = report_cache_from_env();
        let endpoints = PlatformEndpoints::from_env();

        let credentials = AccountCredentials::from_env();
        if credentials.shopify.is_none() {
            warn!("⚠️ Shopify credentials not configured; dashboard requests will fail");
        }
        if credentials.meta_ads.is_none() {
            warn!("Meta Ads credentials not configured; marketing sections will be empty");
        }
        if credentials.shiprocket.is_none() {
            warn!("Shiprocket token not configured; shipping sections will be empty");
        }

        let cost_overrides = Arc::new(load_cost_overrides());
        let engine = Arc::new(DashboardEngine::new(http_client, report_cache, endpoints));

        Ok(AppState {
            engine,
            credentials,
            cost_overrides,
            started_at: Instant::now(),
        })
    }
}
