//! Configuration schema (dashmeta.toml)

use crate::catalog::{DatabaseService, StaticCatalog};
use crate::entity::ChartType;
use crate::filter::{FilterError, FilterPattern};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which Superset access path to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Superset REST API
    Api,

    /// Direct reflection of the Superset metadata database
    Db,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Api
    }
}

/// Source settings for one dashboard service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Dashboard service name (first FQN part of charts and dashboards)
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Base URL of the Superset web UI
    #[serde(default = "default_host_port")]
    pub host_port: String,

    /// Emit data models and their lineage
    #[serde(default = "default_true")]
    pub include_data_models: bool,

    /// Database services to build table lineage against
    #[serde(default)]
    pub db_service_names: Vec<String>,

    #[serde(default)]
    pub dashboard_filter_pattern: FilterPattern,

    #[serde(default)]
    pub chart_filter_pattern: FilterPattern,

    #[serde(default)]
    pub data_model_filter_pattern: FilterPattern,

    /// Viz type → chart type entries consulted before the built-in table
    #[serde(default)]
    pub chart_type_overrides: HashMap<String, ChartType>,
}

fn default_service_name() -> String {
    "superset".to_string()
}

fn default_host_port() -> String {
    "http://localhost:8088".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            service_name: default_service_name(),
            host_port: default_host_port(),
            include_data_models: true,
            db_service_names: Vec::new(),
            dashboard_filter_pattern: FilterPattern::default(),
            chart_filter_pattern: FilterPattern::default(),
            data_model_filter_pattern: FilterPattern::default(),
            chart_type_overrides: HashMap::new(),
        }
    }
}

impl SourceConfig {
    /// Host without trailing slashes, ready for path concatenation
    pub fn clean_host(&self) -> &str {
        self.host_port.trim_end_matches('/')
    }
}

/// A downstream database service known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseServiceConfig {
    pub name: String,

    /// Database name override for lineage
    #[serde(default)]
    pub database_name: Option<String>,

    /// Known table FQNs; when any service lists tables, unknown tables get no lineage
    #[serde(default)]
    pub tables: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub database_services: Vec<DatabaseServiceConfig>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.service_name.trim().is_empty() {
            return Err(ConfigError::Invalid("source.service_name must not be empty".to_string()));
        }

        self.source.dashboard_filter_pattern.compile()?;
        self.source.chart_filter_pattern.compile()?;
        self.source.data_model_filter_pattern.compile()?;

        for name in &self.source.db_service_names {
            if !self.database_services.iter().any(|s| &s.name == name) {
                tracing::warn!(
                    service = %name,
                    "db_service_names entry has no [[database_services]] definition"
                );
            }
        }

        Ok(())
    }

    /// Build the service catalog declared by this config
    pub fn catalog(&self) -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        for service in &self.database_services {
            let mut entry = DatabaseService::new(&service.name);
            entry.database_name = service.database_name.clone();
            catalog = catalog.with_service(entry);
            for table in &service.tables {
                catalog = catalog.with_table(table);
            }
        }
        catalog
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}
