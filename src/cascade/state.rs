//! Per-level cascade state

use serde::Serialize;

use crate::error::UpstreamFetchError;
use crate::hierarchy::{EntityRef, HierarchyLevel, SelectionState};

/// Load status of one level's option list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum LevelStatus {
    /// Nothing requested yet
    Idle,
    /// A shallower selection changed; options must be fetched again
    NeedsReload,
    /// Fetch in flight
    Loading,
    /// Options reflect the current parent selection
    Ready,
    /// Last fetch failed; options are empty
    Failed(String),
}

/// Options and status for one level
#[derive(Debug, Clone)]
pub(crate) struct LevelState {
    pub options: Vec<EntityRef>,
    pub status: LevelStatus,
    /// Generation stamp of the fetch this level is waiting for
    pub token: u64,
}

impl Default for LevelState {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            status: LevelStatus::Idle,
            token: 0,
        }
    }
}

/// What happened to the child-option fetch triggered by a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Options applied to `level`
    Applied { level: HierarchyLevel, count: usize },
    /// A newer selection made the result stale; it was discarded
    Superseded { level: HierarchyLevel },
    /// The fetch failed; `level` now has no options and a reported error
    Failed {
        level: HierarchyLevel,
        error: UpstreamFetchError,
    },
    /// The selected level has no children to load
    Leaf,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }
}

/// Read-only view of the whole cascade, for rendering
#[derive(Debug, Clone, Serialize)]
pub struct CascadeSnapshot {
    pub selection: SelectionState,
    pub levels: Vec<LevelSnapshot>,
}

/// Read-only view of one level
#[derive(Debug, Clone, Serialize)]
pub struct LevelSnapshot {
    pub level: HierarchyLevel,
    pub selected: Option<EntityRef>,
    pub options: Vec<EntityRef>,
    pub status: LevelStatus,
}
