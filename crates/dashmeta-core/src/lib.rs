//! dashmeta Core
//!
//! Canonical entity model shared by every backend: charts, dashboards,
//! data models, columns and lineage edges, plus the naming authority that
//! turns hierarchy context into stable fully-qualified names.

pub mod catalog;
pub mod config;
pub mod entity;
pub mod filter;
pub mod fqn;
pub mod status;
pub mod types;

pub use catalog::{DatabaseService, ServiceCatalog, StaticCatalog};
pub use config::{BackendKind, Config, ConfigError, DatabaseServiceConfig, SourceConfig};
pub use entity::{
    AddLineageRequest, ChartType, Column, CreateChartRequest, CreateDashboardRequest,
    CreateDataModelRequest, CreateRequest, DataModelType, DataType, EntityReference, EntityType,
};
pub use filter::{FilterError, FilterPattern, NameFilter};
pub use fqn::FqnError;
pub use status::{Failure, IngestionStatus, Outcome, ReportVersion, StatusSummary};
pub use types::{parse_column_type, ParsedType};
