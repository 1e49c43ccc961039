//! Hierarchy cascade controller
//!
//! Holds the selection at every hierarchy level and the option list for each
//! level. Picking a value at level N clears every deeper level and loads the
//! options for level N+1 scoped to the new selection.
//!
//! ```text
//! set_selection(SECTOR, A)
//!     │  validate A.level and A.parent_id against the DEPARTMENT selection
//!     │  selection[SECTOR] = A; clear MACHINE_TYPE..REWORK_CAUSE
//!     │  stamp MACHINE_TYPE..REWORK_CAUSE with generation g
//!     ▼
//! list_entities(MACHINE_TYPE, A.id)   (no lock held)
//!     │
//!     ▼
//! token(MACHINE_TYPE) == g ? apply : discard
//! ```
//!
//! A later selection at the same or a shallower level restamps the pending
//! level, so results from the earlier fetch are dropped on arrival. Requests
//! are never aborted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cascade::state::{
    CascadeSnapshot, LevelSnapshot, LevelState, LevelStatus, LoadOutcome,
};
use crate::error::{InvalidSelection, UpstreamFetchError};
use crate::hierarchy::{EntityId, EntityRef, HierarchyLevel, SelectionState};
use crate::source::DataSource;

#[derive(Debug, Default)]
struct CascadeState {
    selection: SelectionState,
    levels: [LevelState; HierarchyLevel::COUNT],
    /// Monotonically increasing; bumped on every change that invalidates a fetch
    generation: u64,
}

impl CascadeState {
    fn level(&self, level: HierarchyLevel) -> &LevelState {
        &self.levels[level.depth()]
    }

    fn level_mut(&mut self, level: HierarchyLevel) -> &mut LevelState {
        &mut self.levels[level.depth()]
    }

    fn validate(&self, level: HierarchyLevel, entity: &EntityRef) -> Result<(), InvalidSelection> {
        if entity.level != level {
            return Err(InvalidSelection::LevelMismatch {
                entity_id: entity.id,
                expected: level,
                actual: entity.level,
            });
        }

        if let Some(parent_level) = level.parent() {
            let expected = self.selection.id_at(parent_level);
            if expected.is_none() || entity.parent_id != expected {
                return Err(InvalidSelection::ParentMismatch {
                    level,
                    parent_level,
                    entity_id: entity.id,
                    expected,
                    actual: entity.parent_id,
                });
            }
        }

        Ok(())
    }

    /// Clear options below `level` and stamp them with a new generation
    fn invalidate_below(&mut self, level: HierarchyLevel) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        for deeper in level.deeper() {
            let slot = self.level_mut(deeper);
            slot.options.clear();
            slot.status = LevelStatus::NeedsReload;
            slot.token = generation;
        }
        generation
    }

    /// Mark `level` as loading under a new generation
    fn begin_load(&mut self, level: HierarchyLevel) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let slot = self.level_mut(level);
        slot.status = LevelStatus::Loading;
        slot.token = generation;
        generation
    }
}

/// State machine over the hierarchy selection
pub struct HierarchyCascadeController {
    source: Arc<dyn DataSource>,
    state: Mutex<CascadeState>,
}

impl HierarchyCascadeController {
    /// Create a controller in the initial state (nothing selected)
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            state: Mutex::new(CascadeState::default()),
        }
    }

    /// Load the department list. Call once when the hosting form opens.
    pub async fn load_root(&self) -> LoadOutcome {
        let generation = self.lock().begin_load(HierarchyLevel::Department);
        self.fetch_into(HierarchyLevel::Department, None, generation)
            .await
    }

    /// Select `entity` at `level`.
    ///
    /// Clears every deeper level, then loads the options for the next level
    /// scoped to `entity.id`. Fails without touching state if `entity` is not
    /// a `level` entity or its parent is not the current selection one level
    /// up. A fetch failure does not undo the selection.
    pub async fn set_selection(
        &self,
        level: HierarchyLevel,
        entity: EntityRef,
    ) -> Result<LoadOutcome, InvalidSelection> {
        let parent_id = entity.id;

        let pending = {
            let mut state = self.lock();
            state.validate(level, &entity)?;

            tracing::debug!(%level, id = entity.id, name = %entity.name, "Selection changed");

            state.selection.set(level, entity);
            if let Some(child) = level.child() {
                state.selection.clear_from(child);
            }
            state.invalidate_below(level);

            level.child().map(|child| (child, state.begin_load(child)))
        };

        match pending {
            Some((child, generation)) => Ok(self.fetch_into(child, Some(parent_id), generation).await),
            None => Ok(LoadOutcome::Leaf),
        }
    }

    /// Deselect `level` and everything below it. Options at `level` stay.
    pub fn clear_from(&self, level: HierarchyLevel) {
        let mut state = self.lock();
        state.selection.clear_from(level);
        state.invalidate_below(level);
        tracing::debug!(%level, "Selection cleared");
    }

    /// Re-fetch the options for `level` from the current parent selection.
    ///
    /// Retry path after a failed load. Returns `None` when `level` has no
    /// parent selection to scope the fetch by.
    pub async fn reload(&self, level: HierarchyLevel) -> Option<LoadOutcome> {
        let (parent_id, generation) = {
            let mut state = self.lock();
            let parent_id = match level.parent() {
                Some(parent_level) => Some(state.selection.id_at(parent_level)?),
                None => None,
            };
            (parent_id, state.begin_load(level))
        };

        Some(self.fetch_into(level, parent_id, generation).await)
    }

    /// Return to the initial state. In-flight fetches are discarded.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = CascadeState {
            generation,
            ..CascadeState::default()
        };
        for slot in state.levels.iter_mut() {
            slot.token = generation;
        }
        tracing::debug!("Cascade reset");
    }

    /// Snapshot of the current selection
    pub fn selection(&self) -> SelectionState {
        self.lock().selection.clone()
    }

    /// Current options for `level`
    pub fn options_for(&self, level: HierarchyLevel) -> Vec<EntityRef> {
        self.lock().level(level).options.clone()
    }

    pub fn status_of(&self, level: HierarchyLevel) -> LevelStatus {
        self.lock().level(level).status.clone()
    }

    /// Level-local error message from the last failed fetch
    pub fn error_for(&self, level: HierarchyLevel) -> Option<String> {
        match &self.lock().level(level).status {
            LevelStatus::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Full read-only view for rendering
    pub fn snapshot(&self) -> CascadeSnapshot {
        let state = self.lock();
        let levels = HierarchyLevel::ALL
            .into_iter()
            .map(|level| LevelSnapshot {
                level,
                selected: state.selection.get(level).cloned(),
                options: state.level(level).options.clone(),
                status: state.level(level).status.clone(),
            })
            .collect();

        CascadeSnapshot {
            selection: state.selection.clone(),
            levels,
        }
    }

    async fn fetch_into(
        &self,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
        generation: u64,
    ) -> LoadOutcome {
        let result = self.source.list_entities(level, parent_id).await;
        self.apply(level, generation, result)
    }

    fn apply(
        &self,
        level: HierarchyLevel,
        generation: u64,
        result: Result<Vec<EntityRef>, UpstreamFetchError>,
    ) -> LoadOutcome {
        let mut state = self.lock();
        let slot = state.level_mut(level);

        if slot.token != generation {
            tracing::debug!(
                %level,
                generation,
                current = slot.token,
                "Discarding stale option list"
            );
            return LoadOutcome::Superseded { level };
        }

        match result {
            Ok(options) => {
                let count = options.len();
                slot.options = options;
                slot.status = LevelStatus::Ready;
                tracing::debug!(%level, count, "Options loaded");
                LoadOutcome::Applied { level, count }
            }
            Err(error) => {
                tracing::warn!(%level, error = %error, "Option fetch failed");
                slot.options.clear();
                slot.status = LevelStatus::Failed(error.to_string());
                LoadOutcome::Failed { level, error }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CascadeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
