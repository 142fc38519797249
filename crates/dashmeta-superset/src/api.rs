//! REST API backend

use crate::backend::{ChartPages, Dashboards, SupersetBackend};
use crate::client::{FetchError, SupersetApi};
use crate::db::database_from_uri;
use crate::models::{ChartRecord, ColumnRecord, DashboardRecord, DatasourceRef};

/// Page size used when walking list endpoints
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Walk a zero-based paged listing
///
/// Pages are requested while `page * page_size <= total`. A failed page is
/// yielded as an `Err` and the walk moves on; a failed total ends the walk
/// after yielding that one error.
pub(crate) fn paginate<'a, T: 'a>(
    listing: &'static str,
    total: Result<u64, FetchError>,
    page_size: u64,
    mut fetch_page: impl FnMut(u64) -> Result<Vec<T>, FetchError> + 'a,
) -> Box<dyn Iterator<Item = Result<Vec<T>, FetchError>> + 'a> {
    match total {
        Err(e) => {
            tracing::warn!(listing, error = %e, "failed to count entries");
            Box::new(std::iter::once(Err(e)))
        }
        Ok(total) => {
            tracing::debug!(listing, total, page_size, "paginating");
            Box::new(
                (0u64..)
                    .take_while(move |page| page * page_size <= total)
                    .map(move |page| {
                        let result = fetch_page(page);
                        if let Err(e) = &result {
                            tracing::warn!(listing, page, error = %e, "failed to fetch page");
                        }
                        result
                    }),
            )
        }
    }
}

/// Join a host and a relative path with exactly one slash
fn join_url(host: &str, path: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Backend reading Superset through its REST API
pub struct ApiBackend<C> {
    client: C,
    page_size: u64,
}

impl<C: SupersetApi> ApiBackend<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the listing page size (minimum 1)
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: SupersetApi> SupersetBackend for ApiBackend<C> {
    fn name(&self) -> &'static str {
        "api"
    }

    fn chart_pages(&self) -> ChartPages<'_> {
        paginate(
            "charts",
            self.client.fetch_total_charts(),
            self.page_size,
            move |page| {
                self.client
                    .fetch_charts(page, self.page_size)
                    .map(|response| response.into_records())
            },
        )
    }

    fn dashboards(&self) -> Dashboards<'_> {
        let pages = paginate(
            "dashboards",
            self.client.fetch_total_dashboards(),
            self.page_size,
            move |page| {
                self.client
                    .fetch_dashboards(page, self.page_size)
                    .map(|response| response.result.into_iter().map(DashboardRecord::from).collect())
            },
        );

        Box::new(pages.flat_map(|page| match page {
            Ok(dashboards) => dashboards.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        }))
    }

    fn datasource(&self, chart: &ChartRecord) -> Result<Option<DatasourceRef>, FetchError> {
        let Some(id) = chart.datasource_id.as_deref() else {
            return Ok(None);
        };

        let response = self
            .client
            .fetch_datasource(id)?
            .ok_or_else(|| FetchError::NotFound(format!("datasource {}", id)))?;

        Ok(Some(DatasourceRef {
            id: response.id,
            table_name: response.result.table_name,
            schema: response.result.schema,
            database_id: response.result.database.id,
            connection_uri: None,
            columns: Some(response.result.columns),
        }))
    }

    fn default_database(&self, datasource: &DatasourceRef) -> Result<Option<String>, FetchError> {
        let Some(id) = datasource.database_id.as_deref() else {
            return Ok(None);
        };

        let database = self
            .client
            .fetch_database(id)?
            .ok_or_else(|| FetchError::NotFound(format!("database {}", id)))?;

        let declared = database
            .result
            .parameters
            .and_then(|parameters| parameters.database)
            .filter(|name| !name.trim().is_empty());

        match (declared, database.result.sqlalchemy_uri.as_deref()) {
            (Some(name), _) => Ok(Some(name)),
            (None, Some(uri)) => database_from_uri(uri),
            (None, None) => Ok(None),
        }
    }

    fn columns(&self, datasource: &DatasourceRef) -> Result<Vec<ColumnRecord>, FetchError> {
        Ok(datasource.columns.clone().unwrap_or_default())
    }

    fn chart_url(&self, host: &str, chart: &ChartRecord) -> String {
        match chart.url.as_deref() {
            Some(path) => join_url(host, path),
            None => join_url(host, &format!("/explore/?slice_id={}", chart.id)),
        }
    }

    fn dashboard_url(&self, host: &str, dashboard: &DashboardRecord) -> String {
        match dashboard.url.as_deref() {
            Some(path) => join_url(host, path),
            None => join_url(host, &format!("/superset/dashboard/{}/", dashboard.id)),
        }
    }
}
