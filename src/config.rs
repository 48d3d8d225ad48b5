//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_MAX_MEMORY_BYTES;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Memory ceiling per entity cache in bytes
    pub max_memory_bytes: u64,
    /// Interval in seconds between full cache sweeps
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_MEMORY_BYTES` - Per-cache memory ceiling (default: 100 MiB)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 1800)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            max_memory_bytes: env_or("CACHE_MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval)
                .max(1),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            sweep_interval: 30 * 60,
        }
    }
}
