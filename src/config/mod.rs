//! Sector configuration model and the default template

pub mod sector_config;
pub mod template;

pub use sector_config::{
    BackendEndpoints, FieldDefinition, FieldKind, FieldSchema, SectorConfig, SectorOverride,
    TestDictionary,
};
pub use template::{DefaultConfigTemplate, DEFAULT_ACTIVITIES};
