//! Sector configuration types
//!
//! A `SectorConfig` is what the forms need to render a sector's registration
//! screens: which fields exist, the test dictionaries, the lifecycle activities
//! and the backend paths to post to. It is always the default template with an
//! optional `SectorOverride` applied on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedKey;

/// Test dictionaries: dictionary name -> (test code -> description)
pub type TestDictionary = BTreeMap<String, BTreeMap<String, String>>;

/// Field schema: field name -> definition
pub type FieldSchema = BTreeMap<String, FieldDefinition>;

/// Input kind for a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Time,
    Select,
    Boolean,
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    pub fn new(label: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            label: label.into(),
            kind,
            required,
        }
    }
}

/// Backend paths a sector posts its records to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEndpoints {
    /// Time-tracking records
    pub apontamento: String,
    /// Service orders
    pub ordem_servico: String,
}

/// Fully resolved configuration for one sector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorConfig {
    pub sector_key: NormalizedKey,
    pub display_name: String,
    pub field_schema: FieldSchema,
    pub test_dictionary: TestDictionary,
    pub activity_list: Vec<String>,
    pub backend_endpoints: BackendEndpoints,
}

/// Sector-specific partial configuration fetched from the data source.
///
/// The sector key is identity and cannot be overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorOverride {
    pub display_name: Option<String>,
    pub field_schema: Option<FieldSchema>,
    pub test_dictionary: Option<TestDictionary>,
    pub activity_list: Option<Vec<String>>,
    pub backend_endpoints: Option<BackendEndpoints>,
}

impl SectorOverride {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.field_schema.is_none()
            && self.test_dictionary.is_none()
            && self.activity_list.is_none()
            && self.backend_endpoints.is_none()
    }

    /// Names of the fields this override sets, for logging
    pub fn overridden_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.display_name.is_some() {
            fields.push("display_name");
        }
        if self.field_schema.is_some() {
            fields.push("field_schema");
        }
        if self.test_dictionary.is_some() {
            fields.push("test_dictionary");
        }
        if self.activity_list.is_some() {
            fields.push("activity_list");
        }
        if self.backend_endpoints.is_some() {
            fields.push("backend_endpoints");
        }
        fields
    }
}

impl SectorConfig {
    /// Apply an override field by field.
    ///
    /// Each present field replaces the default wholesale. A partial
    /// `test_dictionary` replaces the entire dictionary map, not individual
    /// test entries; the same holds for `field_schema` and `backend_endpoints`.
    pub fn apply_override(mut self, overrides: SectorOverride) -> Self {
        let SectorOverride {
            display_name,
            field_schema,
            test_dictionary,
            activity_list,
            backend_endpoints,
        } = overrides;

        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(field_schema) = field_schema {
            self.field_schema = field_schema;
        }
        if let Some(test_dictionary) = test_dictionary {
            self.test_dictionary = test_dictionary;
        }
        if let Some(activity_list) = activity_list {
            self.activity_list = activity_list;
        }
        if let Some(backend_endpoints) = backend_endpoints {
            self.backend_endpoints = backend_endpoints;
        }

        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.field_schema.get(name)
    }

    /// Names of required fields
    pub fn required_fields(&self) -> Vec<&str> {
        self.field_schema
            .iter()
            .filter(|(_, def)| def.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
