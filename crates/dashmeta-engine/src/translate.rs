//! Entity translators
//!
//! Map backend records onto canonical create requests. Translators are pure
//! with respect to the run: they read the processing context but never
//! register anything in it.

use crate::context::ProcessingContext;
use dashmeta_core::{
    parse_column_type, ChartType, Column, CreateChartRequest, CreateDashboardRequest,
    CreateDataModelRequest, DataModelType, FqnError, SourceConfig,
};
use dashmeta_superset::{
    ChartRecord, ColumnRecord, DashboardRecord, DatasourceRef, FetchError, SupersetBackend,
};
use std::collections::HashMap;

/// Errors building a single entity
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Invalid name: {0}")]
    Name(#[from] FqnError),

    #[error("Datasource {0} has no table name")]
    MissingTableName(String),

    #[error("Failed to list columns")]
    Columns(#[source] FetchError),
}

/// Built-in viz type table
///
/// Covers the ECharts-era viz keys plus the common legacy ones. The legacy
/// NVD3 `line` key is deliberately absent and falls through to `Other`.
fn builtin_chart_type(viz_type: &str) -> ChartType {
    match viz_type {
        "echarts_timeseries"
        | "echarts_timeseries_line"
        | "echarts_timeseries_smooth"
        | "echarts_timeseries_step"
        | "mixed_timeseries"
        | "line_multi"
        | "compare" => ChartType::Line,

        "echarts_timeseries_bar" | "dist_bar" | "bar" | "waterfall" => ChartType::Bar,
        "echarts_area" | "area" => ChartType::Area,
        "pie" | "rose" => ChartType::Pie,
        "table" | "pivot_table" | "pivot_table_v2" | "time_table" | "paired_ttest" => ChartType::Table,
        "histogram" | "histogram_v2" => ChartType::Histogram,
        "echarts_timeseries_scatter" | "bubble" | "bubble_v2" => ChartType::Scatter,
        "big_number" | "big_number_total" | "markup" | "handlebars" => ChartType::Text,
        "box_plot" => ChartType::BoxPlot,
        "sankey" | "sankey_v2" => ChartType::SanKey,
        "gauge_chart" | "bullet" => ChartType::Gauge,

        "world_map" | "country_map" | "mapbox" | "deck_arc" | "deck_geojson" | "deck_grid"
        | "deck_hex" | "deck_path" | "deck_polygon" | "deck_scatter" | "deck_screengrid"
        | "deck_multi" => ChartType::Map,

        "graph_chart" | "tree_chart" | "treemap_v2" | "sunburst_v2" | "chord" | "partition"
        | "directed_force" => ChartType::Graph,

        "heatmap" | "heatmap_v2" | "cal_heatmap" => ChartType::Heatmap,
        "gantt_chart" | "event_flow" => ChartType::Timeline,
        _ => ChartType::Other,
    }
}

/// Canonical chart type for a backend viz type
///
/// `overrides` (keys matched case-insensitively) are consulted before the
/// built-in table. Absent or unknown viz types map to [`ChartType::Other`].
pub fn chart_type(viz_type: Option<&str>, overrides: &HashMap<String, ChartType>) -> ChartType {
    let Some(viz_type) = viz_type.map(str::trim).filter(|v| !v.is_empty()) else {
        return ChartType::Other;
    };

    if let Some((_, overridden)) = overrides.iter().find(|(key, _)| key.eq_ignore_ascii_case(viz_type)) {
        return *overridden;
    }

    builtin_chart_type(&viz_type.to_lowercase())
}

pub fn chart_request<B: SupersetBackend + ?Sized>(
    backend: &B,
    chart: &ChartRecord,
    ctx: &ProcessingContext,
    config: &SourceConfig,
) -> CreateChartRequest {
    CreateChartRequest {
        name: chart.id.clone(),
        display_name: chart.slice_name.clone(),
        description: chart.description.clone(),
        chart_type: chart_type(chart.viz_type.as_deref(), &config.chart_type_overrides),
        source_url: backend.chart_url(config.clean_host(), chart),
        service: ctx.service_fqn().to_string(),
    }
}

/// Dashboard request referencing the charts emitted so far
pub fn dashboard_request<B: SupersetBackend + ?Sized>(
    backend: &B,
    dashboard: &DashboardRecord,
    ctx: &ProcessingContext,
    config: &SourceConfig,
) -> CreateDashboardRequest {
    CreateDashboardRequest {
        name: dashboard.id.clone(),
        display_name: dashboard.title.clone(),
        source_url: backend.dashboard_url(config.clean_host(), dashboard),
        charts: ctx.chart_fqns(),
        service: ctx.service_fqn().to_string(),
    }
}

pub fn data_model_request<B: SupersetBackend + ?Sized>(
    backend: &B,
    datasource: &DatasourceRef,
    ctx: &ProcessingContext,
) -> Result<CreateDataModelRequest, BuildError> {
    let table_name = datasource
        .table_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| BuildError::MissingTableName(datasource.id.clone()))?;

    let records = backend.columns(datasource).map_err(BuildError::Columns)?;

    Ok(CreateDataModelRequest {
        name: datasource.id.clone(),
        display_name: table_name,
        service: ctx.service_fqn().to_string(),
        columns: columns(&records),
        data_model_type: DataModelType::SupersetDataModel,
    })
}

/// Convert column records, dropping only records with no name at all
pub fn columns(records: &[ColumnRecord]) -> Vec<Column> {
    records
        .iter()
        .filter_map(|record| {
            let column = column(record);
            if column.is_none() {
                tracing::warn!(record = ?record, "column without id or name, skipped");
            }
            column
        })
        .collect()
}

fn column(record: &ColumnRecord) -> Option<Column> {
    let name = record.id.clone().or_else(|| record.column_name.clone())?;
    let parsed = parse_column_type(record.type_name.as_deref());

    Some(
        Column::new(name, parsed.data_type)
            .with_display_name(record.column_name.clone())
            .with_description(record.description.clone())
            .with_type_display(record.type_name.clone())
            .with_length(parsed.data_length)
            .with_precision(parsed.precision, parsed.scale),
    )
}
