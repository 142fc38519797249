//! Ingestion pipeline
//!
//! One assembly routine for both backends: prime the chart cache, stream
//! dashboards, and for each dashboard emit its charts, data models, the
//! dashboard itself and finally its lineage. The pipeline never looks at
//! which backend it is driving.

use crate::context::ProcessingContext;
use crate::lineage::LineageBuilder;
use crate::translate::{chart_request, dashboard_request, data_model_request};
use dashmeta_core::{
    CreateChartRequest, CreateDataModelRequest, CreateRequest, Failure, FilterError, FqnError,
    IngestionStatus, NameFilter, Outcome, ServiceCatalog, SourceConfig,
};
use dashmeta_superset::{ChartCache, Dashboards, DashboardRecord, SupersetBackend};
use std::collections::VecDeque;
use std::iter::{Fuse, FusedIterator};

/// Errors that prevent a run from starting
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid dashboard service: {0}")]
    Service(#[from] FqnError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

struct Filters {
    dashboards: NameFilter,
    charts: NameFilter,
    data_models: NameFilter,
}

impl Filters {
    fn compile(config: &SourceConfig) -> Result<Self, FilterError> {
        Ok(Self {
            dashboards: config.dashboard_filter_pattern.compile()?,
            charts: config.chart_filter_pattern.compile()?,
            data_models: config.data_model_filter_pattern.compile()?,
        })
    }
}

/// State of one ingestion run
pub struct IngestionRun<'a, B: ?Sized, C: ?Sized> {
    backend: &'a B,
    catalog: &'a C,
    config: &'a SourceConfig,
    filters: Filters,
    cache: ChartCache,
    context: ProcessingContext,
    status: IngestionStatus,
}

impl<'a, B, C> IngestionRun<'a, B, C>
where
    B: SupersetBackend + ?Sized,
    C: ServiceCatalog + ?Sized,
{
    /// Start a run: compile filters and prime the chart cache
    pub fn prepare(backend: &'a B, config: &'a SourceConfig, catalog: &'a C) -> Result<Self, EngineError> {
        let filters = Filters::compile(config)?;
        let context = ProcessingContext::new(config.service_name.as_str())?;

        tracing::info!(backend = backend.name(), service = %config.service_name, "preparing ingestion run");
        let mut status = IngestionStatus::new();
        let cache = ChartCache::prepare(backend, &mut status);

        Ok(Self {
            backend,
            catalog,
            config,
            filters,
            cache,
            context,
            status,
        })
    }

    pub fn cache(&self) -> &ChartCache {
        &self.cache
    }

    pub fn status(&self) -> &IngestionStatus {
        &self.status
    }

    pub fn into_status(self) -> IngestionStatus {
        self.status
    }

    /// Lazily emit the requests of every dashboard
    pub fn into_stream(self) -> RequestStream<'a, B, C> {
        let backend = self.backend;
        RequestStream {
            dashboards: backend.dashboards().fuse(),
            pending: VecDeque::new(),
            run: self,
            finished: false,
        }
    }

    /// All requests for one dashboard, in emission order
    pub fn process_dashboard(&mut self, dashboard: &DashboardRecord) -> Vec<CreateRequest> {
        let mut requests = Vec::new();
        let title = dashboard.display_name().to_string();

        if self.filters.dashboards.is_filtered(&title) {
            self.status.filter(title, "Dashboard pattern not allowed");
            return requests;
        }

        if let Err(e) = self.context.begin_dashboard(&dashboard.id) {
            tracing::error!(dashboard_id = %dashboard.id, error = %e, "cannot name dashboard");
            self.status.failed(Failure::from_error(&dashboard.id, &e));
            return requests;
        }

        let chart_ids = match dashboard.chart_ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(dashboard_id = %dashboard.id, error = %e, "unreadable dashboard layout, no charts");
                Vec::new()
            }
        };

        for chart_id in &chart_ids {
            let outcome = self.chart(chart_id);
            if let Some(chart) = self.status.record(outcome) {
                self.status.scanned(format!("Chart Scanned: {}", chart.display_name.as_deref().unwrap_or(&chart.name)));
                requests.push(CreateRequest::Chart(chart));
            }
        }

        if self.config.include_data_models {
            for chart_id in self.context.chart_ids() {
                let Some(outcome) = self.data_model(&chart_id) else {
                    continue;
                };
                if let Some(model) = self.status.record(outcome) {
                    self.status.scanned(format!("Data Model Scanned: {}", model.display_name));
                    requests.push(CreateRequest::DataModel(model));
                }
            }
        }

        let dashboard_request = dashboard_request(self.backend, dashboard, &self.context, self.config);
        self.status.scanned(format!("Dashboard Scanned: {}", title));
        requests.push(CreateRequest::Dashboard(dashboard_request));

        let lineage = LineageBuilder::new(self.backend, self.catalog, &self.config.db_service_names);
        for outcome in lineage.data_model_edges(&self.context) {
            if let Some(edge) = self.status.record(outcome) {
                requests.push(CreateRequest::Lineage(edge));
            }
        }
        for edge in lineage.table_edges(&self.context, &self.cache, &mut self.status) {
            requests.push(CreateRequest::Lineage(edge));
        }

        tracing::debug!(dashboard_id = %dashboard.id, requests = requests.len(), "dashboard processed");
        requests
    }

    fn chart(&mut self, chart_id: &str) -> Outcome<CreateChartRequest> {
        let Some(chart) = self.cache.get(chart_id) else {
            tracing::warn!(chart_id, "chart details not found in cache, skipped");
            return Outcome::skipped(chart_id, "Chart not found in chart cache");
        };

        let name = chart.display_name();
        if self.filters.charts.is_filtered(name) {
            return Outcome::filtered(name, "Chart pattern not allowed");
        }

        let request = chart_request(self.backend, chart, &self.context, self.config);
        match self.context.register_chart(chart_id) {
            Ok(_) => Outcome::Built(request),
            Err(e) => Outcome::Failed(Failure::from_error(chart_id, &e)),
        }
    }

    /// Data model for the datasource behind `chart_id`
    ///
    /// `None` when that datasource was already handled for this dashboard.
    fn data_model(&mut self, chart_id: &str) -> Option<Outcome<CreateDataModelRequest>> {
        let chart = self.cache.get(chart_id)?;

        let datasource = match self.backend.datasource(chart) {
            Ok(Some(datasource)) => datasource,
            Ok(None) => {
                tracing::debug!(chart_id, "chart has no datasource");
                return Some(Outcome::skipped(chart_id, "Chart has no datasource"));
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(chart_id, error = %e, "datasource not found, skipped");
                return Some(Outcome::skipped(chart_id, e.to_string()));
            }
            Err(e) => {
                tracing::error!(chart_id, error = %e, "failed to fetch datasource");
                return Some(Outcome::Failed(Failure::from_error(chart_id, &e)));
            }
        };

        if !self.context.claim_datasource(&datasource.id) {
            return None;
        }

        let name = datasource.display_name().to_string();
        if self.filters.data_models.is_filtered(&name) {
            return Some(Outcome::filtered(name, "Data model filtered out."));
        }

        let request = match data_model_request(self.backend, &datasource, &self.context) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(datasource = %datasource.id, error = %e, "error building data model");
                return Some(Outcome::Failed(Failure::from_error(&datasource.id, &e)));
            }
        };

        Some(match self.context.register_data_model(&datasource.id) {
            Ok(_) => Outcome::Built(request),
            Err(e) => Outcome::Failed(Failure::from_error(&datasource.id, &e)),
        })
    }
}

/// Lazy, finite, non-restartable stream of create requests
///
/// Buffers at most one dashboard's worth of requests.
pub struct RequestStream<'a, B: ?Sized, C: ?Sized> {
    run: IngestionRun<'a, B, C>,
    dashboards: Fuse<Dashboards<'a>>,
    pending: VecDeque<CreateRequest>,
    finished: bool,
}

impl<'a, B, C> RequestStream<'a, B, C>
where
    B: SupersetBackend + ?Sized,
    C: ServiceCatalog + ?Sized,
{
    /// Status so far
    pub fn status(&self) -> &IngestionStatus {
        self.run.status()
    }

    pub fn into_status(self) -> IngestionStatus {
        self.run.into_status()
    }
}

impl<'a, B, C> Iterator for RequestStream<'a, B, C>
where
    B: SupersetBackend + ?Sized,
    C: ServiceCatalog + ?Sized,
{
    type Item = CreateRequest;

    fn next(&mut self) -> Option<CreateRequest> {
        loop {
            if let Some(request) = self.pending.pop_front() {
                return Some(request);
            }

            match self.dashboards.next() {
                Some(Ok(dashboard)) => {
                    let requests = self.run.process_dashboard(&dashboard);
                    self.pending.extend(requests);
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "dashboard listing error");
                    self.run.status.failed(Failure::from_error("dashboard listing", &e));
                }
                None => {
                    if !self.finished {
                        self.finished = true;
                        let summary = &self.run.status.summary;
                        tracing::info!(
                            scanned = summary.scanned,
                            filtered = summary.filtered,
                            skipped = summary.skipped,
                            failed = summary.failed,
                            "ingestion finished"
                        );
                    }
                    return None;
                }
            }
        }
    }
}

impl<'a, B, C> FusedIterator for RequestStream<'a, B, C>
where
    B: SupersetBackend + ?Sized,
    C: ServiceCatalog + ?Sized,
{
}
