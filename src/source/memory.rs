//! Catalog-backed data source
//!
//! Serves the hierarchy from an in-memory [`Catalog`]. Used by the CLI and as
//! the default double in tests; call counters make fetch behaviour observable.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::config::SectorOverride;
use crate::error::{ConfigError, UpstreamFetchError};
use crate::hierarchy::{EntityId, EntityRef, HierarchyLevel};
use crate::source::catalog::Catalog;
use crate::source::traits::DataSource;

/// In-memory [`DataSource`] over a validated catalog
pub struct InMemoryDataSource {
    catalog: Catalog,

    // Stats (atomic, no locks)
    entity_lists: AtomicU64,
    override_fetches: AtomicU64,
    sector_lists: AtomicU64,
}

impl InMemoryDataSource {
    /// Create a source over an already validated catalog
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            entity_lists: AtomicU64::new(0),
            override_fetches: AtomicU64::new(0),
            sector_lists: AtomicU64::new(0),
        }
    }

    /// Validate and wrap a catalog
    pub fn try_new(catalog: Catalog) -> Result<Self, ConfigError> {
        catalog.validate()?;
        Ok(Self::new(catalog))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(Catalog::from_file(path)?))
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(Catalog::from_yaml(content)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Get current call counts
    pub fn stats(&self) -> SourceStats {
        SourceStats {
            entity_lists: self.entity_lists.load(Ordering::Relaxed),
            override_fetches: self.override_fetches.load(Ordering::Relaxed),
            sector_lists: self.sector_lists.load(Ordering::Relaxed),
        }
    }
}

/// Call counters for a data source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// `list_entities` calls
    pub entity_lists: u64,
    /// `fetch_sector_override` calls
    pub override_fetches: u64,
    /// `list_sectors` calls
    pub sector_lists: u64,
}

impl SourceStats {
    pub fn total(&self) -> u64 {
        self.entity_lists + self.override_fetches + self.sector_lists
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn list_entities(
        &self,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<EntityRef>, UpstreamFetchError> {
        self.entity_lists.fetch_add(1, Ordering::Relaxed);
        Ok(self.catalog.children(level, parent_id))
    }

    async fn fetch_sector_override(
        &self,
        sector_id: EntityId,
    ) -> Result<Option<SectorOverride>, UpstreamFetchError> {
        self.override_fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.catalog.overrides.get(&sector_id).cloned())
    }

    async fn list_sectors(&self) -> Result<Vec<EntityRef>, UpstreamFetchError> {
        self.sector_lists.fetch_add(1, Ordering::Relaxed);
        Ok(self.catalog.sectors())
    }
}
