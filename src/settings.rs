//! Registry settings
//!
//! Loaded from YAML, with the file path and the log filter overridable through
//! the environment.
//!
//! ```yaml
//! catalog_path: "config/catalog.yaml"
//! log_filter: "maint_registry=debug"
//! policy:
//!   production_sectors: ["Bobinagem", "Montagem"]
//! cache:
//!   warm_sectors: ["Bobinagem"]
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::policy::{AccessPolicyEvaluator, DEFAULT_PRODUCTION_SECTORS};

/// Environment variable naming the settings file
pub const CONFIG_PATH_ENV: &str = "MAINT_REGISTRY_CONFIG";

/// Environment variable overriding `log_filter`
pub const LOG_FILTER_ENV: &str = "MAINT_REGISTRY_LOG";

/// Default settings path
pub const DEFAULT_CONFIG_PATH: &str = "config/registry.yaml";

/// Root settings structure
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    /// YAML catalog served by the in-memory data source
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// `tracing_subscriber::EnvFilter` directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Access policy settings
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySettings {
    /// Sector names whose staff work in production
    #[serde(default = "default_production_sectors")]
    pub production_sectors: Vec<String>,
}

/// Cache settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Sectors resolved eagerly at startup
    #[serde(default)]
    pub warm_sectors: Vec<String>,
}

fn default_catalog_path() -> String {
    "config/catalog.yaml".to_string()
}

fn default_log_filter() -> String {
    "maint_registry=info".to_string()
}

fn default_production_sectors() -> Vec<String> {
    DEFAULT_PRODUCTION_SECTORS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            production_sectors: default_production_sectors(),
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            log_filter: default_log_filter(),
            policy: PolicySettings::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl RegistrySettings {
    /// Load settings from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load settings from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let settings: RegistrySettings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Load settings the way the binary does.
    ///
    /// Uses `MAINT_REGISTRY_CONFIG` if set, else `config/registry.yaml` if it
    /// exists, else defaults. `MAINT_REGISTRY_LOG` overrides the log filter.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(filter) = std::env::var(LOG_FILTER_ENV) {
            settings.log_filter = filter;
        }

        Ok(settings)
    }

    /// Build the access policy evaluator described by these settings
    pub fn access_policy(&self) -> AccessPolicyEvaluator {
        AccessPolicyEvaluator::new(&self.policy.production_sectors)
    }
}
