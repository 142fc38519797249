//! Superset records
//!
//! Wire shapes for the REST API responses and the metadata-database rows,
//! plus the backend-neutral records the pipeline works on. Superset returns
//! numeric ids from some endpoints and strings from others; every id is
//! normalized to `String` on the way in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserialize a required id that may be a number or a string
fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("id must be a string or a number"))
}

/// Deserialize an optional id that may be a number or a string
fn flexible_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(id_from_value))
}

fn flexible_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|v| id_from_value(v).ok_or_else(|| serde::de::Error::custom("invalid id in ids list")))
        .collect()
}

// =============================================================================
// REST API shapes
// =============================================================================

/// Chart as returned by `GET /api/v1/chart/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChart {
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub slice_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub viz_type: Option<String>,

    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub datasource_id: Option<String>,

    /// Relative explore URL
    #[serde(default)]
    pub url: Option<String>,
}

/// One page of the chart listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartListResponse {
    #[serde(default)]
    pub count: u64,

    /// Chart ids, parallel to `result`
    #[serde(default, deserialize_with = "flexible_ids")]
    pub ids: Vec<String>,

    #[serde(default)]
    pub result: Vec<ApiChart>,
}

impl ChartListResponse {
    /// Pair each chart with its id
    ///
    /// Ids come from the parallel `ids` list, falling back to the chart's own
    /// `id` field. Charts with neither are dropped.
    pub fn into_records(self) -> Vec<ChartRecord> {
        let mut ids = self.ids.into_iter();
        self.result
            .into_iter()
            .filter_map(|chart| {
                let listed = ids.next();
                let id = listed.or_else(|| chart.id.clone());
                match id {
                    Some(id) => Some(ChartRecord::from_api(id, chart)),
                    None => {
                        tracing::warn!(chart = ?chart.slice_name, "chart without id in listing, skipped");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Dashboard as returned by `GET /api/v1/dashboard/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDashboard {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    #[serde(default)]
    pub dashboard_title: Option<String>,

    /// Relative dashboard URL
    #[serde(default)]
    pub url: Option<String>,

    /// Serialized layout tree
    #[serde(default)]
    pub position_json: Option<String>,

    #[serde(default)]
    pub published: Option<bool>,
}

/// One page of the dashboard listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardListResponse {
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub result: Vec<ApiDashboard>,
}

/// Reference to the database owning a datasource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRef {
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub database_name: Option<String>,
}

/// Body of `GET /api/v1/dataset/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceResult {
    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default, alias = "table_schema")]
    pub schema: Option<String>,

    #[serde(default)]
    pub database: DatabaseRef,

    #[serde(default)]
    pub columns: Vec<ColumnRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceResponse {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    #[serde(default)]
    pub result: DatasourceResult,
}

/// Connection parameters of a database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseParameters {
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

/// Body of `GET /api/v1/database/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResult {
    #[serde(default)]
    pub database_name: Option<String>,

    #[serde(default)]
    pub parameters: Option<DatabaseParameters>,

    #[serde(default)]
    pub sqlalchemy_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResponse {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    #[serde(default)]
    pub result: DatabaseResult,
}

// =============================================================================
// Metadata database rows
// =============================================================================

/// Row of the chart query (`slices` joined with `tables` and `dbs`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRow {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    #[serde(default)]
    pub slice_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub viz_type: Option<String>,

    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub datasource_id: Option<String>,

    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default, alias = "table_schema")]
    pub schema: Option<String>,

    #[serde(default)]
    pub database_name: Option<String>,

    #[serde(default)]
    pub sqlalchemy_uri: Option<String>,
}

/// Row of the dashboard query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRow {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,

    #[serde(default)]
    pub dashboard_title: Option<String>,

    #[serde(default)]
    pub position_json: Option<String>,
}

// =============================================================================
// Backend-neutral records
// =============================================================================

/// Table a chart reads from, as embedded in metadata-database chart rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedTable {
    pub table_name: Option<String>,
    pub schema: Option<String>,
    pub sqlalchemy_uri: Option<String>,
}

/// A chart, whichever backend it came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: String,
    pub slice_name: Option<String>,
    pub description: Option<String>,
    pub viz_type: Option<String>,
    pub datasource_id: Option<String>,

    /// Relative URL (REST API only)
    pub url: Option<String>,

    /// Embedded table reference (metadata database only)
    pub table: Option<EmbeddedTable>,
}

impl ChartRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn from_api(id: String, chart: ApiChart) -> Self {
        Self {
            id,
            slice_name: chart.slice_name,
            description: chart.description,
            viz_type: chart.viz_type,
            datasource_id: chart.datasource_id,
            url: chart.url,
            table: None,
        }
    }

    /// Name used by chart filters and logs
    pub fn display_name(&self) -> &str {
        self.slice_name.as_deref().unwrap_or(&self.id)
    }
}

impl From<ChartRow> for ChartRecord {
    fn from(row: ChartRow) -> Self {
        let table = if row.table_name.is_some() || row.sqlalchemy_uri.is_some() {
            Some(EmbeddedTable {
                table_name: row.table_name,
                schema: row.schema,
                sqlalchemy_uri: row.sqlalchemy_uri,
            })
        } else {
            None
        };

        Self {
            id: row.id,
            slice_name: row.slice_name,
            description: row.description,
            viz_type: row.viz_type,
            datasource_id: row.datasource_id,
            url: None,
            table,
        }
    }
}

/// A dashboard, whichever backend it came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRecord {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub position_json: Option<String>,
}

impl DashboardRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Name used by dashboard filters and logs
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Chart ids placed on this dashboard
    ///
    /// Every `CHART-*` node of the layout tree contributes its
    /// `meta.chartId`. Ids follow the order nodes appear in the layout
    /// document, with duplicates removed.
    pub fn chart_ids(&self) -> Result<Vec<String>, serde_json::Error> {
        let Some(raw) = self.position_json.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        let layout: serde_json::Map<String, Value> = serde_json::from_str(raw)?;
        let mut ids: Vec<String> = Vec::new();

        for (key, node) in &layout {
            if !key.starts_with("CHART-") {
                continue;
            }
            let chart_id = node
                .get("meta")
                .and_then(|meta| meta.get("chartId"))
                .cloned()
                .and_then(id_from_value);

            match chart_id {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => tracing::debug!(dashboard_id = %self.id, node = %key, "chart node without chartId"),
            }
        }

        Ok(ids)
    }
}

impl From<ApiDashboard> for DashboardRecord {
    fn from(dashboard: ApiDashboard) -> Self {
        Self {
            id: dashboard.id,
            title: dashboard.dashboard_title,
            url: dashboard.url,
            position_json: dashboard.position_json,
        }
    }
}

impl From<DashboardRow> for DashboardRecord {
    fn from(row: DashboardRow) -> Self {
        Self {
            id: row.id,
            title: row.dashboard_title,
            url: None,
            position_json: row.position_json,
        }
    }
}

/// A datasource column, from the dataset endpoint or the column query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub column_name: Option<String>,

    #[serde(default, rename = "type")]
    pub type_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Owning table (column query only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl ColumnRecord {
    pub fn new(
        id: impl Into<String>,
        column_name: impl Into<String>,
        type_name: Option<&str>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            column_name: Some(column_name.into()),
            type_name: type_name.map(str::to_string),
            description: None,
            table_name: None,
        }
    }
}

/// A chart's resolved datasource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasourceRef {
    /// Backend datasource id, used as the data model name
    pub id: String,

    pub table_name: Option<String>,

    pub schema: Option<String>,

    /// Owning database id (REST API only)
    pub database_id: Option<String>,

    /// SQLAlchemy URI of the owning database (metadata database only)
    pub connection_uri: Option<String>,

    /// Columns returned inline with the datasource (REST API only)
    pub columns: Option<Vec<ColumnRecord>>,
}

impl DatasourceRef {
    /// Name used by data model filters and logs
    pub fn display_name(&self) -> &str {
        self.table_name.as_deref().unwrap_or(&self.id)
    }
}
