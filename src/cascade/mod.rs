//! Dependent-selection cascade across the hierarchy levels

pub mod controller;
pub mod state;

pub use controller::HierarchyCascadeController;
pub use state::{CascadeSnapshot, LevelSnapshot, LevelStatus, LoadOutcome};
