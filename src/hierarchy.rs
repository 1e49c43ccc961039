//! Hierarchy value types
//!
//! The registry is a strict containment chain:
//!
//! ```text
//! Department ─► Sector ─► MachineType ─► TestType ─► Activity ─► FailureType ─► ReworkCause
//! ```
//!
//! Every level except `Department` has exactly one parent level, the one
//! immediately shallower. Depth drives cascade invalidation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifier assigned to entities by the data source
pub type EntityId = i64;

/// Level in the containment hierarchy, ordered shallowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Department,
    Sector,
    MachineType,
    TestType,
    Activity,
    FailureType,
    ReworkCause,
}

impl HierarchyLevel {
    /// All levels, shallowest first
    pub const ALL: [HierarchyLevel; 7] = [
        HierarchyLevel::Department,
        HierarchyLevel::Sector,
        HierarchyLevel::MachineType,
        HierarchyLevel::TestType,
        HierarchyLevel::Activity,
        HierarchyLevel::FailureType,
        HierarchyLevel::ReworkCause,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based depth (Department = 0)
    pub fn depth(self) -> usize {
        self as usize
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::ALL.get(depth).copied()
    }

    /// The level one step shallower, `None` for Department
    pub fn parent(self) -> Option<Self> {
        self.depth().checked_sub(1).and_then(Self::from_depth)
    }

    /// The level one step deeper, `None` for ReworkCause
    pub fn child(self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }

    pub fn is_root(self) -> bool {
        self == HierarchyLevel::Department
    }

    /// Levels strictly deeper than this one
    pub fn deeper(self) -> impl Iterator<Item = HierarchyLevel> {
        Self::ALL.into_iter().skip(self.depth() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyLevel::Department => "department",
            HierarchyLevel::Sector => "sector",
            HierarchyLevel::MachineType => "machine_type",
            HierarchyLevel::TestType => "test_type",
            HierarchyLevel::Activity => "activity",
            HierarchyLevel::FailureType => "failure_type",
            HierarchyLevel::ReworkCause => "rework_cause",
        }
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HierarchyLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownValue {
                kind: "hierarchy level",
                value: s.to_string(),
            })
    }
}

/// Reference to a single entity as handed out by the data source.
///
/// Immutable: a rename on the server shows up as a new lookup result, never
/// as an in-place edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: String,
    pub level: HierarchyLevel,
    #[serde(default)]
    pub parent_id: Option<EntityId>,
}

impl EntityRef {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            parent_id,
        }
    }

    /// A top-level department
    pub fn department(id: EntityId, name: impl Into<String>) -> Self {
        Self::new(id, name, HierarchyLevel::Department, None)
    }

    /// A child entity at `level` under `parent_id`
    pub fn child(
        id: EntityId,
        name: impl Into<String>,
        level: HierarchyLevel,
        parent_id: EntityId,
    ) -> Self {
        Self::new(id, name, level, Some(parent_id))
    }

    /// Check the local half of the parent invariant: only departments may be
    /// parentless, and every other level must name a parent.
    pub fn has_valid_parent_shape(&self) -> bool {
        self.level.is_root() == self.parent_id.is_none()
    }
}

/// Current selection at every hierarchy level.
///
/// Invariant: if a level is unset, every deeper level is unset too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    slots: [Option<EntityRef>; HierarchyLevel::COUNT],
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: HierarchyLevel) -> Option<&EntityRef> {
        self.slots[level.depth()].as_ref()
    }

    /// Id of the selection at `level`, if any
    pub fn id_at(&self, level: HierarchyLevel) -> Option<EntityId> {
        self.get(level).map(|e| e.id)
    }

    /// Deepest level that currently has a selection
    pub fn deepest(&self) -> Option<HierarchyLevel> {
        HierarchyLevel::ALL
            .into_iter()
            .rev()
            .find(|level| self.get(*level).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate over `(level, selection)` pairs, shallowest first
    pub fn iter(&self) -> impl Iterator<Item = (HierarchyLevel, Option<&EntityRef>)> {
        HierarchyLevel::ALL
            .into_iter()
            .map(move |level| (level, self.get(level)))
    }

    /// True when no set level sits below an unset one
    pub fn is_consistent(&self) -> bool {
        let mut seen_gap = false;
        for slot in &self.slots {
            match (slot, seen_gap) {
                (None, _) => seen_gap = true,
                (Some(_), true) => return false,
                (Some(_), false) => {}
            }
        }
        true
    }

    pub(crate) fn set(&mut self, level: HierarchyLevel, entity: EntityRef) {
        self.slots[level.depth()] = Some(entity);
    }

    /// Unset `level` and everything deeper
    pub(crate) fn clear_from(&mut self, level: HierarchyLevel) {
        for slot in &mut self.slots[level.depth()..] {
            *slot = None;
        }
    }
}
