//! Sector configuration cache

pub mod config_cache;

pub use config_cache::{CacheEntry, CacheStats, ConfigCache};
