//! Response DTOs for the order tracker API
//!
//! Defines the structure of outgoing HTTP response bodies. Entities are
//! serialized directly.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the cache stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Stats per entity cache, keyed by cache name
    pub caches: BTreeMap<&'static str, CacheStatsEntry>,
}

/// One cache's counters plus its hit rate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsEntry {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    pub fn new(stats: impl IntoIterator<Item = (&'static str, CacheStats)>) -> Self {
        let caches = stats
            .into_iter()
            .map(|(name, stats)| {
                let hit_rate = stats.hit_rate();
                (name, CacheStatsEntry { stats, hit_rate })
            })
            .collect();
        Self { caches }
    }
}

/// Response body for the cache flush endpoint (POST /api/cache/flush)
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    /// Names of the caches that were cleared
    pub flushed: Vec<&'static str>,
}

/// Response body for the most visited URL (GET /api/statistics/top-visited)
#[derive(Debug, Clone, Serialize)]
pub struct TopVisitedResponse {
    pub url: String,
    pub count: u64,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
