//! Client contracts for reaching Superset
//!
//! Two access paths exist: the REST API ([`SupersetApi`]) and direct SQL
//! against the Superset metadata database ([`MetadataDatabase`]). Transport
//! details (HTTP session, authentication, connection pooling) live behind
//! these traits.

use crate::models::{ChartListResponse, DashboardListResponse, DatabaseResponse, DatasourceResponse};

/// A row from the metadata database, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur when talking to Superset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FetchError {
    /// Whether the error means a referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Superset REST API surface used by the connector
///
/// Pages are zero-based.
pub trait SupersetApi {
    /// Total number of charts
    fn fetch_total_charts(&self) -> Result<u64, FetchError>;

    /// One page of charts
    fn fetch_charts(&self, page: u64, page_size: u64) -> Result<ChartListResponse, FetchError>;

    /// Total number of dashboards
    fn fetch_total_dashboards(&self) -> Result<u64, FetchError>;

    /// One page of dashboards
    fn fetch_dashboards(&self, page: u64, page_size: u64) -> Result<DashboardListResponse, FetchError>;

    /// Dataset record, `None` when the id is unknown
    fn fetch_datasource(&self, id: &str) -> Result<Option<DatasourceResponse>, FetchError>;

    /// Database record, `None` when the id is unknown
    fn fetch_database(&self, id: &str) -> Result<Option<DatabaseResponse>, FetchError>;
}

impl<T: SupersetApi + ?Sized> SupersetApi for &T {
    fn fetch_total_charts(&self) -> Result<u64, FetchError> {
        (**self).fetch_total_charts()
    }

    fn fetch_charts(&self, page: u64, page_size: u64) -> Result<ChartListResponse, FetchError> {
        (**self).fetch_charts(page, page_size)
    }

    fn fetch_total_dashboards(&self) -> Result<u64, FetchError> {
        (**self).fetch_total_dashboards()
    }

    fn fetch_dashboards(&self, page: u64, page_size: u64) -> Result<DashboardListResponse, FetchError> {
        (**self).fetch_dashboards(page, page_size)
    }

    fn fetch_datasource(&self, id: &str) -> Result<Option<DatasourceResponse>, FetchError> {
        (**self).fetch_datasource(id)
    }

    fn fetch_database(&self, id: &str) -> Result<Option<DatabaseResponse>, FetchError> {
        (**self).fetch_database(id)
    }
}

/// Queries issued against the Superset metadata database
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetadataQuery {
    /// Every chart with its table and database connection
    AllCharts,

    /// Every dashboard with its layout
    Dashboards,

    /// Columns of a table, matched case-insensitively by table name
    ColumnsOf { table_name: String },
}

const FETCH_ALL_CHARTS: &str = r#"
    SELECT
        s.id,
        s.slice_name,
        s.description,
        s.viz_type,
        s.datasource_id,
        t.table_name,
        t.schema,
        db.database_name,
        db.sqlalchemy_uri
    FROM slices s
    LEFT JOIN tables t
        ON s.datasource_id = t.id AND s.datasource_type = 'table'
    LEFT JOIN dbs db
        ON db.id = t.database_id
"#;

const FETCH_DASHBOARDS: &str = r#"
    SELECT
        d.id,
        d.dashboard_title,
        d.position_json
    FROM dashboards d
"#;

const FETCH_COLUMNS: &str = r#"
    SELECT
        tc.id,
        t.table_name,
        tc.column_name,
        tc.type,
        tc.description
    FROM table_columns tc
    INNER JOIN tables t
        ON t.id = tc.table_id
    WHERE lower(t.table_name) = $1
"#;

impl MetadataQuery {
    /// Columns of `table_name`
    pub fn columns_of(table_name: &str) -> Self {
        Self::ColumnsOf {
            table_name: table_name.to_lowercase(),
        }
    }

    /// Parameterized SQL text
    pub fn sql(&self) -> &'static str {
        match self {
            Self::AllCharts => FETCH_ALL_CHARTS,
            Self::Dashboards => FETCH_DASHBOARDS,
            Self::ColumnsOf { .. } => FETCH_COLUMNS,
        }
    }

    /// Positional parameters bound to `$1..`
    pub fn params(&self) -> Vec<&str> {
        match self {
            Self::AllCharts | Self::Dashboards => Vec::new(),
            Self::ColumnsOf { table_name } => vec![table_name.as_str()],
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::AllCharts => "all_charts",
            Self::Dashboards => "dashboards",
            Self::ColumnsOf { .. } => "columns",
        }
    }
}

/// Read-only access to the Superset metadata database
pub trait MetadataDatabase {
    /// Run a query and return its rows
    fn execute(&self, query: &MetadataQuery) -> Result<Vec<Row>, FetchError>;
}

impl<T: MetadataDatabase + ?Sized> MetadataDatabase for &T {
    fn execute(&self, query: &MetadataQuery) -> Result<Vec<Row>, FetchError> {
        (**self).execute(query)
    }
}
