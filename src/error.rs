//! Error types for the registry core
//!
//! Library code returns these `thiserror` enums; only the binary reaches for
//! `anyhow`.

use thiserror::Error;

use crate::hierarchy::{EntityId, HierarchyLevel};

/// Main error type surfaced to the UI layer
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] InvalidSelection),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(#[from] UpstreamFetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A selection that violates the parent/child invariant.
///
/// Always a programmer or UI error; the controller never corrects it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error("entity {entity_id} is a {actual} but was selected as a {expected}")]
    LevelMismatch {
        entity_id: EntityId,
        expected: HierarchyLevel,
        actual: HierarchyLevel,
    },

    #[error("{level} {entity_id} belongs to parent {actual:?}, but the current {parent_level} selection is {expected:?}")]
    ParentMismatch {
        level: HierarchyLevel,
        parent_level: HierarchyLevel,
        entity_id: EntityId,
        expected: Option<EntityId>,
        actual: Option<EntityId>,
    },
}

/// Failure reported by a [`DataSource`](crate::source::DataSource) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFetchError {
    #[error("request for {operation} failed: {message}")]
    Request { operation: String, message: String },

    #[error("request for {operation} timed out")]
    Timeout { operation: String },

    #[error("malformed payload from {operation}: {message}")]
    Payload { operation: String, message: String },
}

impl UpstreamFetchError {
    pub fn request(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn payload(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Payload {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Settings and catalog loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
