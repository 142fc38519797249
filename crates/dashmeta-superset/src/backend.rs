//! Backend strategy: one retrieval contract, two access paths
//!
//! The pipeline only talks to [`SupersetBackend`]. [`crate::ApiBackend`]
//! implements it over the REST API, [`crate::DbBackend`] over the metadata
//! database.

use crate::client::FetchError;
use crate::models::{ChartRecord, ColumnRecord, DashboardRecord, DatasourceRef};

/// Chart pages, each either a batch of charts or the error that lost it
pub type ChartPages<'a> = Box<dyn Iterator<Item = Result<Vec<ChartRecord>, FetchError>> + 'a>;

/// Dashboards in backend order
///
/// An `Err` item marks a page or row that could not be read; iteration
/// continues past it.
pub type Dashboards<'a> = Box<dyn Iterator<Item = Result<DashboardRecord, FetchError>> + 'a>;

pub trait SupersetBackend {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Every chart, page by page
    fn chart_pages(&self) -> ChartPages<'_>;

    /// Every dashboard, lazily
    fn dashboards(&self) -> Dashboards<'_>;

    /// The datasource a chart reads from
    ///
    /// `Ok(None)` means the chart carries no datasource link at all;
    /// `Err(NotFound)` means it names one the backend does not know.
    fn datasource(&self, chart: &ChartRecord) -> Result<Option<DatasourceRef>, FetchError>;

    /// Default database name of the connection owning `datasource`
    fn default_database(&self, datasource: &DatasourceRef) -> Result<Option<String>, FetchError>;

    /// Columns of `datasource`
    fn columns(&self, datasource: &DatasourceRef) -> Result<Vec<ColumnRecord>, FetchError>;

    /// Absolute URL of a chart in the Superset UI
    fn chart_url(&self, host: &str, chart: &ChartRecord) -> String;

    /// Absolute URL of a dashboard in the Superset UI
    fn dashboard_url(&self, host: &str, dashboard: &DashboardRecord) -> String;
}

impl<T: SupersetBackend + ?Sized> SupersetBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn chart_pages(&self) -> ChartPages<'_> {
        (**self).chart_pages()
    }

    fn dashboards(&self) -> Dashboards<'_> {
        (**self).dashboards()
    }

    fn datasource(&self, chart: &ChartRecord) -> Result<Option<DatasourceRef>, FetchError> {
        (**self).datasource(chart)
    }

    fn default_database(&self, datasource: &DatasourceRef) -> Result<Option<String>, FetchError> {
        (**self).default_database(datasource)
    }

    fn columns(&self, datasource: &DatasourceRef) -> Result<Vec<ColumnRecord>, FetchError> {
        (**self).columns(datasource)
    }

    fn chart_url(&self, host: &str, chart: &ChartRecord) -> String {
        (**self).chart_url(host, chart)
    }

    fn dashboard_url(&self, host: &str, dashboard: &DashboardRecord) -> String {
        (**self).dashboard_url(host, dashboard)
    }
}
