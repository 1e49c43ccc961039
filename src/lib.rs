//! Maintenance Registry Core - hierarchical entity resolution and sector
//! configuration cache
//!
//! The administrative front end of the maintenance registry works over a strict
//! containment hierarchy (Department → Sector → Machine Type → Test Type →
//! Activity → Failure Type → Rework Cause). This crate is the part of it that
//! is more than markup:
//!
//! - which child options are valid for the parents currently selected
//! - a per-sector cache of resolved configurations
//! - one normalization function for sector keys, shared by the cache and the
//!   access policy
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Consumers: registration forms, lists, route guards              │
//! └─────────────────────────────────────────────────────────────────┘
//!         │                       │                         │
//!         ▼                       ▼                         ▼
//! ┌────────────────┐   ┌──────────────────────┐   ┌──────────────────────┐
//! │ Cascade        │   │ SectorConfigResolver │   │ AccessPolicyEvaluator │
//! │ Controller     │   │   └─► ConfigCache    │   │                       │
//! └────────────────┘   └──────────────────────┘   └──────────────────────┘
//!         │                       │                         │
//!         │                       └──────── normalize ──────┘
//!         ▼                       ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                DataSource (REST client, catalog, test double)    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use maint_registry::{RegistryCore, RegistrySettings, InMemoryDataSource, HierarchyLevel};
//!
//! let settings = RegistrySettings::from_env()?;
//! let source = Arc::new(InMemoryDataSource::from_file(&settings.catalog_path)?);
//! let core = RegistryCore::new(source, &settings);
//!
//! let config = core.resolve("Bobinagem").await?;
//! let cascade = core.cascade();
//! cascade.load_root().await;
//! ```

pub mod cache;
pub mod cascade;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod normalize;
pub mod policy;
pub mod resolver;
pub mod settings;
pub mod source;

use std::sync::Arc;

// Re-export main types
pub use cache::{CacheEntry, CacheStats, ConfigCache};
pub use cascade::{CascadeSnapshot, HierarchyCascadeController, LevelStatus, LoadOutcome};
pub use config::{DefaultConfigTemplate, SectorConfig, SectorOverride};
pub use error::{ConfigError, InvalidSelection, RegistryError, UpstreamFetchError};
pub use hierarchy::{EntityId, EntityRef, HierarchyLevel, SelectionState};
pub use normalize::{normalize, NormalizedKey};
pub use policy::{AccessPolicyEvaluator, Feature, Principal, Role};
pub use resolver::SectorConfigResolver;
pub use settings::RegistrySettings;
pub use source::{Catalog, DataSource, InMemoryDataSource};

/// The registry core wired over one data source.
///
/// Resolver, cache and policy are shared for the process. Each hosting form
/// gets its own cascade controller from [`RegistryCore::cascade`].
pub struct RegistryCore {
    source: Arc<dyn DataSource>,
    resolver: SectorConfigResolver,
    policy: AccessPolicyEvaluator,
}

impl RegistryCore {
    pub fn new(source: Arc<dyn DataSource>, settings: &RegistrySettings) -> Self {
        Self {
            resolver: SectorConfigResolver::new(source.clone()),
            policy: settings.access_policy(),
            source,
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn resolver(&self) -> &SectorConfigResolver {
        &self.resolver
    }

    pub fn policy(&self) -> &AccessPolicyEvaluator {
        &self.policy
    }

    /// A fresh cascade controller in its initial state
    pub fn cascade(&self) -> HierarchyCascadeController {
        HierarchyCascadeController::new(self.source.clone())
    }

    pub async fn resolve(&self, sector_identifier: &str) -> error::Result<Arc<SectorConfig>> {
        self.resolver.resolve(sector_identifier).await
    }

    /// Resolve every configured warm-up sector, logging failures
    pub async fn warm(&self, sectors: &[String]) -> usize {
        let identifiers: Vec<&str> = sectors.iter().map(String::as_str).collect();
        let results = self.resolver.resolve_many(&identifiers).await;

        let mut warmed = 0;
        for (identifier, result) in identifiers.iter().zip(results) {
            match result {
                Ok(_) => warmed += 1,
                Err(e) => tracing::warn!(sector = %identifier, error = %e, "Cache warm-up failed"),
            }
        }
        warmed
    }

    pub fn can_access_module(&self, role: Role, feature: &str) -> bool {
        self.policy.can_access_module(role, feature)
    }

    pub fn works_in_production(
        &self,
        role: Role,
        raw_sector_name: &str,
        explicit_flag: Option<bool>,
    ) -> bool {
        self.policy
            .works_in_production(role, raw_sector_name, explicit_flag)
    }
}
