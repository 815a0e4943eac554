//! Result cache for aggregated reports.
//!
//! One narrow interface, two backends: an in-process DashMap for
//! single-instance deployments and Redis for multi-instance ones. Entries
//! are whole reports replaced atomically; a reader never observes a
//! partially written value. The instance is built once at startup and
//! injected into the engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool as RedisPool;
use redis::AsyncCommands;
use tracing::{debug, error, info, warn};

use crate::models::report::AggregatedReport;

#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<AggregatedReport>;
    async fn set(&self, key: &str, report: &AggregatedReport, ttl: Duration);
}

struct MemoryEntry {
    report: AggregatedReport,
    expiry: Instant,
}

/// In-process cache with lazy expiry.
#[derive(Clone, Default)]
pub struct MemoryReportCache {
    store: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryReportCache {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl ReportCache for MemoryReportCache {
    async fn get(&self, key: &str) -> Option<AggregatedReport> {
        if let Some(entry) = self.store.get(key) {
            if entry.expiry > Instant::now() {
                return Some(entry.report.clone());
            }
        } else {
            return None;
        }
        // Entry expired, drop it
        self.store.remove(key);
        None
    }

    async fn set(&self, key: &str, report: &AggregatedReport, ttl: Duration) {
        let entry = MemoryEntry {
            report: report.clone(),
            expiry: Instant::now() + ttl,
        };
        self.store.insert(key.to_string(), entry);
    }
}

/// Redis-backed cache shared across instances. Backend failures are logged
/// and treated as misses; they never fail a report request.
pub struct RedisReportCache {
    pool: RedisPool,
    key_prefix: String,
}

impl RedisReportCache {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            key_prefix: "profitfirst:".to_string(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ReportCache for RedisReportCache {
    async fn get(&self, key: &str) -> Option<AggregatedReport> {
        let key = self.full_key(key);
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("failed to get Redis connection: {}", e);
                return None;
            }
        };
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(report) => {
                    debug!("cache HIT for report: {}", key);
                    Some(report)
                }
                Err(e) => {
                    warn!("failed to deserialize cached report {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("cache MISS for report: {}", key);
                None
            }
            Err(e) => {
                error!("Redis error getting report {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, report: &AggregatedReport, ttl: Duration) {
        let key = self.full_key(key);
        let data = match serde_json::to_string(report) {
            Ok(data) => data,
            Err(e) => {
                error!("failed to serialize report for cache: {}", e);
                return;
            }
        };
        let mut conn = match self.pool.get().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("failed to get Redis connection: {}", e);
                return;
            }
        };
        if let Err(e) = conn.set_ex::<_, _, ()>(&key, &data, ttl.as_secs()).await {
            error!("failed to cache report {}: {}", key, e);
        } else {
            debug!("cached report: {}", key);
        }
    }
}

/// Backend selection for the composition root: Redis when `REDIS_URL` is
/// set and a pool can be built, in-process memory otherwise.
pub fn report_cache_from_env() -> Arc<dyn ReportCache> {
    match std::env::var("REDIS_URL") {
        Ok(url) => match deadpool_redis::Config::from_url(&url)
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        {
            Ok(pool) => {
                info!("using Redis report cache");
                Arc::new(RedisReportCache::new(pool))
            }
            Err(e) => {
                warn!("failed to create Redis pool ({}), falling back to memory cache", e);
                Arc::new(MemoryReportCache::new())
            }
        },
        Err(_) => {
            info!("REDIS_URL not set, using in-process report cache");
            Arc::new(MemoryReportCache::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{Breakdowns, ProductRankings, ReportWindow, SourceErrors};

    fn sample_report(marker: &str) -> AggregatedReport {
        AggregatedReport {
            window: ReportWindow {
                start: "2025-06-01".into(),
                end: marker.into(),
            },
            summary: Vec::new(),
            marketing: Vec::new(),
            website: Vec::new(),
            shipping: Vec::new(),
            daily_series: Vec::new(),
            product_rankings: ProductRankings::default(),
            breakdowns: Breakdowns::default(),
            source_errors: SourceErrors::default(),
        }
    }

    #[tokio::test]
    async fn memory_cache_round_trips_within_ttl() {
        let cache = MemoryReportCache::new();
        let report = sample_report("2025-06-30");
        cache.set("k1", &report, Duration::from_secs(60)).await;
        assert_eq!(cache.get("k1").await, Some(report));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn memory_cache_expires_entries() {
        let cache = MemoryReportCache::new();
        let report = sample_report("2025-06-30");
        cache.set("k1", &report, Duration::from_secs(0)).await;
        assert_eq!(cache.get("k1").await, None);
    }

    #[tokio::test]
    async fn memory_cache_replaces_wholesale() {
        let cache = MemoryReportCache::new();
        cache
            .set("k1", &sample_report("2025-06-30"), Duration::from_secs(60))
            .await;
        cache
            .set("k1", &sample_report("2025-07-31"), Duration::from_secs(60))
            .await;
        let cached = cache.get("k1").await.unwrap();
        assert_eq!(cached.window.end, "2025-07-31");
    }
}
