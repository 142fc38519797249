//! Metadata database backend
//!
//! Reads Superset's own tables (`slices`, `dashboards`, `tables`,
//! `table_columns`, `dbs`) through a [`MetadataDatabase`] connection.

use crate::backend::{ChartPages, Dashboards, SupersetBackend};
use crate::client::{FetchError, MetadataDatabase, MetadataQuery};
use crate::models::{ChartRecord, ChartRow, ColumnRecord, DashboardRecord, DashboardRow, DatasourceRef};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use url::Url;

/// Database name carried in a SQLAlchemy connection string
///
/// The database is the URL path with its leading slash removed and
/// percent-escapes decoded. An empty path yields `None`.
///
/// ```
/// use dashmeta_superset::database_from_uri;
///
/// let name = database_from_uri("postgresql+psycopg2://user:pw@db:5432/sales").unwrap();
/// assert_eq!(name.as_deref(), Some("sales"));
/// ```
pub fn database_from_uri(uri: &str) -> Result<Option<String>, FetchError> {
    // The parse error never echoes the URI, which may hold credentials
    let url = Url::parse(uri.trim())
        .map_err(|e| FetchError::ConfigError(format!("Invalid connection string: {}", e)))?;

    let path = url.path();
    let database = path.strip_prefix('/').unwrap_or(path);
    if database.is_empty() {
        return Ok(None);
    }

    let decoded = percent_decode_str(database)
        .decode_utf8()
        .map_err(|e| FetchError::ConfigError(format!("Invalid database name encoding: {}", e)))?;

    Ok(Some(decoded.into_owned()))
}

/// Backend reflecting the Superset metadata database
pub struct DbBackend<D> {
    database: D,
}

impl<D: MetadataDatabase> DbBackend<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Run a query and decode its rows, skipping rows that do not decode
    fn fetch_rows<T: DeserializeOwned>(&self, query: &MetadataQuery) -> Result<Vec<T>, FetchError> {
        let rows = self.database.execute(query)?;
        tracing::debug!(query = query.label(), rows = rows.len(), "metadata query");

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(serde_json::Value::Object(row)) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(query = query.label(), error = %e, "skipping undecodable row");
                    None
                }
            })
            .collect())
    }
}

impl<D: MetadataDatabase> SupersetBackend for DbBackend<D> {
    fn name(&self) -> &'static str {
        "db"
    }

    fn chart_pages(&self) -> ChartPages<'_> {
        let charts = self
            .fetch_rows::<ChartRow>(&MetadataQuery::AllCharts)
            .map(|rows| rows.into_iter().map(ChartRecord::from).collect());
        Box::new(std::iter::once(charts))
    }

    fn dashboards(&self) -> Dashboards<'_> {
        match self.fetch_rows::<DashboardRow>(&MetadataQuery::Dashboards) {
            Ok(rows) => Box::new(rows.into_iter().map(|row| Ok(DashboardRecord::from(row)))),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list dashboards");
                Box::new(std::iter::once(Err(e)))
            }
        }
    }

    fn datasource(&self, chart: &ChartRecord) -> Result<Option<DatasourceRef>, FetchError> {
        let Some(table) = chart.table.as_ref() else {
            return Ok(None);
        };
        let Some(table_name) = table.table_name.clone() else {
            return Ok(None);
        };

        Ok(Some(DatasourceRef {
            id: chart.datasource_id.clone().unwrap_or_else(|| table_name.clone()),
            table_name: Some(table_name),
            schema: table.schema.clone(),
            database_id: None,
            connection_uri: table.sqlalchemy_uri.clone(),
            columns: None,
        }))
    }

    fn default_database(&self, datasource: &DatasourceRef) -> Result<Option<String>, FetchError> {
        match datasource.connection_uri.as_deref() {
            Some(uri) => database_from_uri(uri),
            None => Ok(None),
        }
    }

    fn columns(&self, datasource: &DatasourceRef) -> Result<Vec<ColumnRecord>, FetchError> {
        match datasource.table_name.as_deref() {
            Some(table_name) => self.fetch_rows(&MetadataQuery::columns_of(table_name)),
            None => Ok(Vec::new()),
        }
    }

    fn chart_url(&self, host: &str, chart: &ChartRecord) -> String {
        format!("{}/explore/?slice_id={}", host.trim_end_matches('/'), chart.id)
    }

    fn dashboard_url(&self, host: &str, dashboard: &DashboardRecord) -> String {
        format!("{}/superset/dashboard/{}/", host.trim_end_matches('/'), dashboard.id)
    }
}
