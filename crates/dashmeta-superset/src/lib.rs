//! Superset access for dashmeta
//!
//! Two backends read the same information out of Superset:
//!
//! - [`ApiBackend`] walks the REST API
//! - [`DbBackend`] queries the Superset metadata database directly
//!
//! Both implement [`SupersetBackend`], which is all the ingestion pipeline
//! sees. [`ChartCache`] and [`resolve_table_fqn`] are shared on top of it.
//!
//! ## Example
//!
//! ```rust
//! use dashmeta_superset::{ApiBackend, InMemoryApi, SupersetBackend};
//!
//! let api = InMemoryApi::from_json(r#"{"dashboards": [{"id": 7, "dashboard_title": "Sales"}]}"#).unwrap();
//! let backend = ApiBackend::new(api);
//! let dashboards: Vec<_> = backend.dashboards().collect();
//! assert_eq!(dashboards.len(), 1);
//! ```

pub mod api;
pub mod backend;
pub mod cache;
pub mod client;
pub mod db;
pub mod memory;
pub mod models;
pub mod resolver;

pub use api::{ApiBackend, DEFAULT_PAGE_SIZE};
pub use backend::{ChartPages, Dashboards, SupersetBackend};
pub use cache::ChartCache;
pub use client::{FetchError, MetadataDatabase, MetadataQuery, Row, SupersetApi};
pub use db::{database_from_uri, DbBackend};
pub use memory::{ApiCall, InMemoryApi, InMemoryMetadataDb};
pub use models::{ChartRecord, ColumnRecord, DashboardRecord, DatasourceRef};
pub use resolver::{resolve_datasource_table, resolve_table_fqn};
