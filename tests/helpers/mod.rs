//! Shared fixtures for integration tests
//!
//! `ScriptedSource` serves a catalog like `InMemoryDataSource` but lets a test
//! delay or fail individual calls, so ordering and failure paths can be
//! driven deterministically under a paused tokio clock.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use maint_registry::{
    Catalog, DataSource, EntityId, EntityRef, HierarchyLevel, SectorOverride, UpstreamFetchError,
};

pub const PLANT: &str = r#"
entities:
  - { id: 1, name: "Produção", level: department }
  - { id: 2, name: "Administrativo", level: department }

  - { id: 10, name: "Bobinagem", level: sector, parent_id: 1 }
  - { id: 11, name: "Motores", level: sector, parent_id: 1 }
  - { id: 12, name: "Laboratório de Ensaios Elétricos", level: sector, parent_id: 1 }
  - { id: 20, name: "Financeiro", level: sector, parent_id: 2 }

  - { id: 100, name: "Motor de indução", level: machine_type, parent_id: 10 }
  - { id: 101, name: "Transformador de distribuição", level: machine_type, parent_id: 10 }
  - { id: 110, name: "Motor de corrente contínua", level: machine_type, parent_id: 11 }

  - { id: 1000, name: "Resistência de isolamento", level: test_type, parent_id: 100 }
  - { id: 5000, name: "Medição", level: activity, parent_id: 1000 }
  - { id: 6000, name: "Isolação baixa", level: failure_type, parent_id: 5000 }
  - { id: 7000, name: "Umidade no enrolamento", level: rework_cause, parent_id: 6000 }

overrides:
  11:
    test_dictionary:
      eletricos:
        TI: "Tensão aplicada"
  12:
    display_name: "Laboratório de Ensaios"
"#;

pub fn plant() -> Catalog {
    Catalog::from_yaml(PLANT).unwrap()
}

/// Data source double with scripted latency and failures
pub struct ScriptedSource {
    catalog: Catalog,

    /// `list_entities` delay keyed by parent id
    delays: Mutex<HashMap<Option<EntityId>, Duration>>,
    /// Parent ids whose `list_entities` call fails
    failing_parents: Mutex<HashSet<Option<EntityId>>>,
    override_delay: Mutex<Duration>,
    failing_overrides: AtomicBool,

    entity_lists: AtomicU64,
    override_fetches: AtomicU64,
    sector_lists: AtomicU64,
}

impl ScriptedSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            delays: Mutex::new(HashMap::new()),
            failing_parents: Mutex::new(HashSet::new()),
            override_delay: Mutex::new(Duration::ZERO),
            failing_overrides: AtomicBool::new(false),
            entity_lists: AtomicU64::new(0),
            override_fetches: AtomicU64::new(0),
            sector_lists: AtomicU64::new(0),
        }
    }

    pub fn plant() -> Arc<Self> {
        Arc::new(Self::new(plant()))
    }

    pub fn delay_children_of(&self, parent_id: Option<EntityId>, delay: Duration) {
        self.delays.lock().unwrap().insert(parent_id, delay);
    }

    pub fn fail_children_of(&self, parent_id: Option<EntityId>) {
        self.failing_parents.lock().unwrap().insert(parent_id);
    }

    pub fn heal_children_of(&self, parent_id: Option<EntityId>) {
        self.failing_parents.lock().unwrap().remove(&parent_id);
    }

    pub fn delay_overrides(&self, delay: Duration) {
        *self.override_delay.lock().unwrap() = delay;
    }

    pub fn fail_overrides(&self, fail: bool) {
        self.failing_overrides.store(fail, Ordering::SeqCst);
    }

    pub fn entity_lists(&self) -> u64 {
        self.entity_lists.load(Ordering::SeqCst)
    }

    pub fn override_fetches(&self) -> u64 {
        self.override_fetches.load(Ordering::SeqCst)
    }

    pub fn sector_lists(&self) -> u64 {
        self.sector_lists.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u64 {
        self.entity_lists() + self.override_fetches() + self.sector_lists()
    }

    /// Look up an entity by id, panicking if the fixture lacks it
    pub fn entity(&self, id: EntityId) -> EntityRef {
        self.catalog.get(id).cloned().unwrap()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn list_entities(
        &self,
        level: HierarchyLevel,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<EntityRef>, UpstreamFetchError> {
        self.entity_lists.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&parent_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_parents.lock().unwrap().contains(&parent_id) {
            return Err(UpstreamFetchError::request(
                format!("list {}", level),
                "503 Service Unavailable",
            ));
        }

        Ok(self.catalog.children(level, parent_id))
    }

    async fn fetch_sector_override(
        &self,
        sector_id: EntityId,
    ) -> Result<Option<SectorOverride>, UpstreamFetchError> {
        self.override_fetches.fetch_add(1, Ordering::SeqCst);

        let delay = *self.override_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.failing_overrides.load(Ordering::SeqCst) {
            return Err(UpstreamFetchError::Timeout {
                operation: format!("sector override {}", sector_id),
            });
        }

        Ok(self.catalog.overrides.get(&sector_id).cloned())
    }

    async fn list_sectors(&self) -> Result<Vec<EntityRef>, UpstreamFetchError> {
        self.sector_lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.sectors())
    }
}
