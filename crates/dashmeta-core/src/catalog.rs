//! Lookup of downstream database services and their tables
//!
//! Lineage from warehouse tables to dashboards needs two things the BI
//! backend cannot answer: which database service owns a table, and whether
//! the catalog actually knows that table.

use std::collections::{HashMap, HashSet};

/// A database service registered in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseService {
    /// Service name, first FQN part of every table it owns
    pub name: String,

    /// Database name declared on the service connection
    ///
    /// When set it replaces whatever database the BI backend reports.
    pub database_name: Option<String>,
}

impl DatabaseService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_name: None,
        }
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    /// Database name to use for lineage
    ///
    /// The service-declared name wins over the backend-reported default.
    pub fn database_for_lineage(&self, backend_default: Option<&str>) -> Option<String> {
        self.database_name
            .as_deref()
            .or(backend_default)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Read access to catalog entities the connector joins against
pub trait ServiceCatalog {
    /// Look up a database service by name
    fn database_service(&self, name: &str) -> Option<DatabaseService>;

    /// Whether a table with this FQN exists
    fn table_exists(&self, fqn: &str) -> bool;
}

/// Catalog backed by configuration
///
/// Without a table list every well-formed table FQN is assumed to exist.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    services: HashMap<String, DatabaseService>,
    tables: Option<HashSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a database service
    pub fn with_service(mut self, service: DatabaseService) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }

    /// Register a known table FQN, switching to strict table checks
    pub fn with_table(mut self, fqn: impl Into<String>) -> Self {
        self.tables.get_or_insert_with(HashSet::new).insert(fqn.into());
        self
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

impl ServiceCatalog for StaticCatalog {
    fn database_service(&self, name: &str) -> Option<DatabaseService> {
        self.services.get(name).cloned()
    }

    fn table_exists(&self, fqn: &str) -> bool {
        match &self.tables {
            Some(tables) => tables.contains(fqn),
            None => true,
        }
    }
}
