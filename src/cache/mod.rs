//! Cache Module
//!
//! Provides bounded in-memory entity caches with approximate memory accounting.

mod accountant;
mod accounted;
mod bounded;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use accountant::{string_cost, EstimateSize, Ledger, MemoryAccountant, BASE_ENTRY_COST, BYTES_PER_CHAR};
pub use accounted::{AccountedCache, Admission};
pub use bounded::BoundedCache;
pub use stats::{CacheStats, StatsRecorder};

// == Public Constants ==
/// Default memory ceiling per cache instance in bytes
pub const DEFAULT_MAX_MEMORY_BYTES: u64 = 100 * 1024 * 1024; // 100 MiB
