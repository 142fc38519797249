//! Lineage between data models, warehouse tables and dashboards

use crate::context::ProcessingContext;
use dashmeta_core::{
    AddLineageRequest, EntityReference, EntityType, Failure, IngestionStatus, Outcome,
    ServiceCatalog,
};
use dashmeta_superset::{resolve_table_fqn, ChartCache, SupersetBackend};

/// Builds the lineage edges of the dashboard in the processing context
pub struct LineageBuilder<'a, B: ?Sized, C: ?Sized> {
    backend: &'a B,
    catalog: &'a C,
    db_service_names: &'a [String],
}

impl<'a, B, C> LineageBuilder<'a, B, C>
where
    B: SupersetBackend + ?Sized,
    C: ServiceCatalog + ?Sized,
{
    pub fn new(backend: &'a B, catalog: &'a C, db_service_names: &'a [String]) -> Self {
        Self {
            backend,
            catalog,
            db_service_names,
        }
    }

    /// One data model → dashboard edge per data model in the context
    pub fn data_model_edges(&self, ctx: &ProcessingContext) -> Vec<Outcome<AddLineageRequest>> {
        let models = ctx.data_model_fqns();

        let Some(dashboard_fqn) = ctx.dashboard_fqn() else {
            return models
                .into_iter()
                .map(|model_fqn| {
                    tracing::error!(data_model = %model_fqn, "no dashboard in context for lineage");
                    Outcome::Failed(Failure::new(model_fqn, "lineage without a dashboard in context"))
                })
                .collect();
        };

        models
            .into_iter()
            .map(|model_fqn| {
                Outcome::Built(AddLineageRequest::new(
                    EntityReference::new(EntityType::DashboardDataModel, model_fqn),
                    EntityReference::new(EntityType::Dashboard, dashboard_fqn),
                ))
            })
            .collect()
    }

    /// Table → dashboard edges for every configured database service
    ///
    /// Unknown services are reported once per dashboard as a warning. Charts
    /// whose table cannot be resolved, or resolves to a table the catalog
    /// does not know, contribute no edge.
    pub fn table_edges(
        &self,
        ctx: &ProcessingContext,
        cache: &ChartCache,
        status: &mut IngestionStatus,
    ) -> Vec<AddLineageRequest> {
        let Some(dashboard_fqn) = ctx.dashboard_fqn() else {
            return Vec::new();
        };

        let mut edges = Vec::new();
        for service_name in self.db_service_names {
            let Some(service) = self.catalog.database_service(service_name) else {
                tracing::warn!(service = %service_name, dashboard = %dashboard_fqn, "database service not found, skipping table lineage");
                status.warning(format!(
                    "database service '{}' not found while building lineage for {}",
                    service_name, dashboard_fqn
                ));
                continue;
            };

            for chart_id in ctx.chart_ids() {
                let Some(chart) = cache.get(&chart_id) else {
                    continue;
                };
                let Some(table_fqn) = resolve_table_fqn(self.backend, chart, &service) else {
                    continue;
                };
                if !self.catalog.table_exists(&table_fqn) {
                    tracing::debug!(table = %table_fqn, chart_id = %chart_id, "table not in catalog, no lineage");
                    continue;
                }

                edges.push(AddLineageRequest::new(
                    EntityReference::new(EntityType::Table, table_fqn),
                    EntityReference::new(EntityType::Dashboard, dashboard_fqn),
                ));
            }
        }
        edges
    }
}
