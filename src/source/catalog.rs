//! YAML entity catalog
//!
//! A catalog lists every entity in the hierarchy plus the per-sector override
//! payloads. It backs [`InMemoryDataSource`](super::InMemoryDataSource) for the
//! CLI and for tests.
//!
//! ```yaml
//! entities:
//!   - { id: 1, name: "Produção", level: department }
//!   - { id: 10, name: "Bobinagem", level: sector, parent_id: 1 }
//! overrides:
//!   10:
//!     activity_list: ["Recebimento", "Bobinar", "Impregnar"]
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::SectorOverride;
use crate::error::ConfigError;
use crate::hierarchy::{EntityId, EntityRef, HierarchyLevel};

/// Root catalog structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Catalog {
    pub entities: Vec<EntityRef>,
    #[serde(default)]
    pub overrides: BTreeMap<EntityId, SectorOverride>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load a catalog from a YAML string and validate it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_yaml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the hierarchy invariants:
    /// - ids are unique
    /// - only departments are parentless
    /// - every parent exists exactly one level shallower
    /// - overrides only target sectors
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut by_id: HashMap<EntityId, &EntityRef> = HashMap::new();

        for entity in &self.entities {
            if by_id.insert(entity.id, entity).is_some() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "duplicate entity id {}",
                    entity.id
                )));
            }
        }

        for entity in &self.entities {
            if !entity.has_valid_parent_shape() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "{} '{}' ({}) has parent {:?}",
                    entity.level, entity.name, entity.id, entity.parent_id
                )));
            }

            let (Some(parent_id), Some(parent_level)) = (entity.parent_id, entity.level.parent())
            else {
                continue;
            };

            match by_id.get(&parent_id) {
                Some(parent) if parent.level == parent_level => {}
                Some(parent) => {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "{} '{}' ({}) points at {} '{}' ({}), expected a {}",
                        entity.level,
                        entity.name,
                        entity.id,
                        parent.level,
                        parent.name,
                        parent.id,
                        parent_level
                    )));
                }
                None => {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "{} '{}' ({}) references missing parent {}",
                        entity.level, entity.name, entity.id, parent_id
                    )));
                }
            }
        }

        for sector_id in self.overrides.keys() {
            match by_id.get(sector_id) {
                Some(e) if e.level == HierarchyLevel::Sector => {}
                _ => {
                    return Err(ConfigError::InvalidCatalog(format!(
                        "override for {} does not target a sector",
                        sector_id
                    )));
                }
            }
        }

        Ok(())
    }

    /// Entities at `level` under `parent_id`
    pub fn children(&self, level: HierarchyLevel, parent_id: Option<EntityId>) -> Vec<EntityRef> {
        self.entities
            .iter()
            .filter(|e| e.level == level && e.parent_id == parent_id)
            .cloned()
            .collect()
    }

    pub fn sectors(&self) -> Vec<EntityRef> {
        self.entities
            .iter()
            .filter(|e| e.level == HierarchyLevel::Sector)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRef> {
        self.entities.iter().find(|e| e.id == id)
    }
}
