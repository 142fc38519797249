//! In-memory Superset clients
//!
//! [`InMemoryApi`] and [`InMemoryMetadataDb`] serve a fixed set of records
//! without reaching a live Superset. They back the CLI's snapshot mode and
//! the test suites, and can be told to fail specific calls. Call logging is
//! off unless asked for with `with_call_log` / `with_query_log`.
//!
//! Both deserialize from a JSON snapshot:
//!
//! ```
//! use dashmeta_superset::{InMemoryApi, SupersetApi};
//!
//! let api = InMemoryApi::from_json(r#"{
//!     "charts": [{"id": 42, "slice_name": "Revenue", "viz_type": "bar", "datasource_id": 3}],
//!     "dashboards": [{"id": 7, "dashboard_title": "Sales"}]
//! }"#).unwrap();
//!
//! assert_eq!(api.fetch_total_charts().unwrap(), 1);
//! ```

use crate::client::{FetchError, MetadataDatabase, MetadataQuery, Row, SupersetApi};
use crate::models::{
    ApiChart, ApiDashboard, ChartListResponse, ChartRow, ColumnRecord, DashboardListResponse,
    DashboardRow, DatabaseResponse, DatasourceResponse,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// A REST API call, used to inject failures and inspect traffic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApiCall {
    TotalCharts,
    ChartsPage(u64),
    TotalDashboards,
    DashboardsPage(u64),
    Datasource(String),
    Database(String),
}

fn page_bounds(len: usize, page: u64, page_size: u64) -> (usize, usize) {
    let start = usize::try_from(page.saturating_mul(page_size)).unwrap_or(usize::MAX);
    let end = usize::try_from(page_size).unwrap_or(usize::MAX).saturating_add(start);
    (start.min(len), end.min(len))
}

/// REST API served from memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryApi {
    #[serde(default)]
    charts: Vec<ApiChart>,

    #[serde(default)]
    dashboards: Vec<ApiDashboard>,

    #[serde(default)]
    datasources: Vec<DatasourceResponse>,

    #[serde(default)]
    databases: Vec<DatabaseResponse>,

    #[serde(skip)]
    errors: HashMap<ApiCall, FetchError>,

    /// Recorded calls, present only when logging was requested
    #[serde(skip)]
    calls: Option<RefCell<Vec<ApiCall>>>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_chart(mut self, chart: ApiChart) -> Self {
        self.charts.push(chart);
        self
    }

    pub fn with_dashboard(mut self, dashboard: ApiDashboard) -> Self {
        self.dashboards.push(dashboard);
        self
    }

    pub fn with_datasource(mut self, datasource: DatasourceResponse) -> Self {
        self.datasources.push(datasource);
        self
    }

    pub fn with_database(mut self, database: DatabaseResponse) -> Self {
        self.databases.push(database);
        self
    }

    /// Make `call` fail with `error`
    pub fn with_error(mut self, call: ApiCall, error: FetchError) -> Self {
        self.errors.insert(call, error);
        self
    }

    /// Start recording every call for [`call_log`](Self::call_log)
    pub fn with_call_log(mut self) -> Self {
        self.calls.get_or_insert_with(RefCell::default);
        self
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    pub fn dashboard_count(&self) -> usize {
        self.dashboards.len()
    }

    /// Every call made since logging started, in order
    pub fn call_log(&self) -> Vec<ApiCall> {
        self.calls.as_ref().map(|calls| calls.borrow().clone()).unwrap_or_default()
    }

    /// How many logged calls matched `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls
            .as_ref()
            .map_or(0, |calls| calls.borrow().iter().filter(|call| predicate(call)).count())
    }

    fn record(&self, call: ApiCall) -> Result<(), FetchError> {
        let injected = self.errors.get(&call).cloned();
        if let Some(calls) = &self.calls {
            calls.borrow_mut().push(call);
        }
        match injected {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl SupersetApi for InMemoryApi {
    fn fetch_total_charts(&self) -> Result<u64, FetchError> {
        self.record(ApiCall::TotalCharts)?;
        Ok(self.charts.len() as u64)
    }

    fn fetch_charts(&self, page: u64, page_size: u64) -> Result<ChartListResponse, FetchError> {
        self.record(ApiCall::ChartsPage(page))?;

        let (start, end) = page_bounds(self.charts.len(), page, page_size);
        let result = self.charts[start..end].to_vec();
        let ids: Option<Vec<String>> = result.iter().map(|chart| chart.id.clone()).collect();

        Ok(ChartListResponse {
            count: self.charts.len() as u64,
            ids: ids.unwrap_or_default(),
            result,
        })
    }

    fn fetch_total_dashboards(&self) -> Result<u64, FetchError> {
        self.record(ApiCall::TotalDashboards)?;
        Ok(self.dashboards.len() as u64)
    }

    fn fetch_dashboards(&self, page: u64, page_size: u64) -> Result<DashboardListResponse, FetchError> {
        self.record(ApiCall::DashboardsPage(page))?;

        let (start, end) = page_bounds(self.dashboards.len(), page, page_size);
        Ok(DashboardListResponse {
            count: self.dashboards.len() as u64,
            result: self.dashboards[start..end].to_vec(),
        })
    }

    fn fetch_datasource(&self, id: &str) -> Result<Option<DatasourceResponse>, FetchError> {
        self.record(ApiCall::Datasource(id.to_string()))?;
        Ok(self.datasources.iter().find(|d| d.id == id).cloned())
    }

    fn fetch_database(&self, id: &str) -> Result<Option<DatabaseResponse>, FetchError> {
        self.record(ApiCall::Database(id.to_string()))?;
        Ok(self.databases.iter().find(|d| d.id == id).cloned())
    }
}

/// Metadata database served from memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryMetadataDb {
    #[serde(default)]
    charts: Vec<ChartRow>,

    #[serde(default)]
    dashboards: Vec<DashboardRow>,

    /// Column rows; `table_name` ties each to its table
    #[serde(default)]
    columns: Vec<ColumnRecord>,

    #[serde(skip)]
    errors: HashMap<MetadataQuery, FetchError>,

    #[serde(skip)]
    queries: Option<RefCell<Vec<MetadataQuery>>>,
}

impl InMemoryMetadataDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_chart(mut self, row: ChartRow) -> Self {
        self.charts.push(row);
        self
    }

    pub fn with_dashboard(mut self, row: DashboardRow) -> Self {
        self.dashboards.push(row);
        self
    }

    /// Add a column belonging to `table_name`
    pub fn with_column(mut self, table_name: &str, mut column: ColumnRecord) -> Self {
        column.table_name = Some(table_name.to_string());
        self.columns.push(column);
        self
    }

    /// Make `query` fail with `error`
    pub fn with_error(mut self, query: MetadataQuery, error: FetchError) -> Self {
        self.errors.insert(query, error);
        self
    }

    /// Start recording every query for [`query_log`](Self::query_log)
    pub fn with_query_log(mut self) -> Self {
        self.queries.get_or_insert_with(RefCell::default);
        self
    }

    /// Every query executed since logging started, in order
    pub fn query_log(&self) -> Vec<MetadataQuery> {
        self.queries.as_ref().map(|queries| queries.borrow().clone()).unwrap_or_default()
    }

    fn to_rows<T: Serialize>(items: &[T]) -> Result<Vec<Row>, FetchError> {
        items
            .iter()
            .map(|item| match serde_json::to_value(item) {
                Ok(serde_json::Value::Object(row)) => Ok(row),
                Ok(other) => Err(FetchError::InvalidResponse(format!("row is not an object: {}", other))),
                Err(e) => Err(FetchError::InvalidResponse(e.to_string())),
            })
            .collect()
    }
}

impl MetadataDatabase for InMemoryMetadataDb {
    fn execute(&self, query: &MetadataQuery) -> Result<Vec<Row>, FetchError> {
        if let Some(queries) = &self.queries {
            queries.borrow_mut().push(query.clone());
        }
        if let Some(error) = self.errors.get(query) {
            return Err(error.clone());
        }

        match query {
            MetadataQuery::AllCharts => Self::to_rows(&self.charts),
            MetadataQuery::Dashboards => Self::to_rows(&self.dashboards),
            MetadataQuery::ColumnsOf { table_name } => {
                let matching: Vec<&ColumnRecord> = self
                    .columns
                    .iter()
                    .filter(|column| {
                        column
                            .table_name
                            .as_deref()
                            .is_some_and(|name| name.to_lowercase() == *table_name)
                    })
                    .collect();
                Self::to_rows(&matching)
            }
        }
    }
}
