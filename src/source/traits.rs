//! Core trait for the external data source
//!
//! The registry core never talks to a transport directly. Everything it needs
//! from the backend goes through `DataSource`, so REST clients, fixtures and
//! test doubles can be used interchangeably.

use async_trait::async_trait;

use crate::config::SectorOverride;
use crate::error::UpstreamFetchError;
use crate::hierarchy::{EntityId, EntityRef, HierarchyLevel};

/// The data source trait
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// List entities at `level` whose parent is `parent_id`.
    ///
    /// With `parent_id = None` returns all top-level entities (departments).
    async fn list_entities(
        &self,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<EntityRef>, UpstreamFetchError>;

    /// Fetch the sector-specific override payload.
    ///
    /// Returns `Ok(None)` when the sector has no override.
    async fn fetch_sector_override(
        &self,
        sector_id: EntityId,
    ) -> Result<Option<SectorOverride>, UpstreamFetchError>;

    /// List every known sector, used for identifier resolution
    async fn list_sectors(&self) -> Result<Vec<EntityRef>, UpstreamFetchError>;
}
