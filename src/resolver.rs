//! Sector configuration resolver
//!
//! Turns a free-form sector identifier (an id, or a name in any casing or
//! accentuation) into a complete `SectorConfig`:
//!
//! ```text
//! identifier ──► ConfigCache ──hit──► Arc<SectorConfig>
//!                    │ miss
//!                    ▼
//!              list_sectors() ──► match by id / normalized name / raw name
//!                    │
//!                    ▼
//!        DefaultConfigTemplate + fetch_sector_override() ──► store
//! ```
//!
//! Override fetch failures are absorbed: every known sector resolves to at
//! least the default template.

use std::sync::Arc;

use futures::future::join_all;

use crate::cache::ConfigCache;
use crate::config::{DefaultConfigTemplate, SectorConfig};
use crate::error::{RegistryError, Result};
use crate::hierarchy::EntityRef;
use crate::normalize::normalize;
use crate::source::DataSource;

/// Resolves and caches sector configurations
pub struct SectorConfigResolver {
    source: Arc<dyn DataSource>,
    cache: Arc<ConfigCache>,
}

impl SectorConfigResolver {
    /// Create a resolver with its own empty cache
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_cache(source, Arc::new(ConfigCache::new()))
    }

    /// Create a resolver over an existing cache
    pub fn with_cache(source: Arc<dyn DataSource>, cache: Arc<ConfigCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<ConfigCache> {
        &self.cache
    }

    /// Resolve a sector identifier to its configuration.
    ///
    /// The whole operation is cached under the normalized identifier, so
    /// `resolve("MOTORES")` followed by `resolve("motores")` touches the data
    /// source once and returns the same `Arc`.
    pub async fn resolve(&self, identifier: &str) -> Result<Arc<SectorConfig>> {
        self.cache
            .get_or_compute(identifier, || self.build(identifier))
            .await
    }

    /// Rebuild the configuration from the data source and replace the cached
    /// entry. The previous entry stays in place if the rebuild fails.
    pub async fn refresh(&self, identifier: &str) -> Result<Arc<SectorConfig>> {
        self.cache
            .refresh(identifier, || self.build(identifier))
            .await
    }

    /// Drop the cached configuration for `identifier`
    pub async fn invalidate(&self, identifier: &str) -> bool {
        self.cache.invalidate(identifier).await
    }

    /// Resolve several identifiers concurrently, e.g. to warm the cache
    pub async fn resolve_many(&self, identifiers: &[&str]) -> Vec<Result<Arc<SectorConfig>>> {
        join_all(identifiers.iter().map(|id| self.resolve(id))).await
    }

    /// Find the sector an identifier refers to
    pub async fn find_sector(&self, identifier: &str) -> Result<EntityRef> {
        let sectors = self.source.list_sectors().await?;
        match_sector(&sectors, identifier)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("sector '{}'", identifier)))
    }

    async fn build(&self, identifier: &str) -> Result<SectorConfig> {
        let sector = self.find_sector(identifier).await?;
        let defaults = DefaultConfigTemplate::for_sector(&sector.name);

        match self.source.fetch_sector_override(sector.id).await {
            Ok(Some(overrides)) => {
                tracing::debug!(
                    sector = %sector.name,
                    fields = ?overrides.overridden_fields(),
                    "Applying sector override"
                );
                Ok(defaults.apply_override(overrides))
            }
            Ok(None) => {
                tracing::debug!(sector = %sector.name, "No override, using defaults");
                Ok(defaults)
            }
            Err(e) => {
                tracing::warn!(
                    sector = %sector.name,
                    error = %e,
                    "Override fetch failed, using defaults"
                );
                Ok(defaults)
            }
        }
    }
}

/// Match an identifier against the sector list.
///
/// Priority: exact id (its decimal spelling, nothing else), then
/// normalized-name equality, then raw-name equality.
pub fn match_sector<'a>(sectors: &'a [EntityRef], identifier: &str) -> Option<&'a EntityRef> {
    if let Some(sector) = sectors.iter().find(|s| s.id.to_string() == identifier) {
        return Some(sector);
    }

    let wanted = normalize(identifier);
    if let Some(sector) = sectors.iter().find(|s| wanted.matches(&s.name)) {
        return Some(sector);
    }

    sectors.iter().find(|s| s.name == identifier)
}
