//! End-to-end pipeline tests over both backends
//!
//! Every scenario runs against the in-memory REST API and the in-memory
//! metadata database describing the same Superset deployment
//! (see `fixtures`).

mod fixtures;

use dashmeta_core::{
    ChartType, CreateRequest, DataType, DatabaseService, EntityType, FilterPattern,
    IngestionStatus, ServiceCatalog, SourceConfig, StaticCatalog,
};
use dashmeta_engine::IngestionRun;
use dashmeta_superset::models::{ApiChart, ApiDashboard, DatabaseRef, DatasourceResponse, DatasourceResult};
use dashmeta_superset::{
    ApiBackend, ApiCall, DbBackend, FetchError, InMemoryApi, MetadataQuery, SupersetBackend,
};
use pretty_assertions::assert_eq;

// =============================================================================
// Helpers
// =============================================================================

fn run<B: SupersetBackend + ?Sized, C: ServiceCatalog + ?Sized>(
    backend: &B,
    config: &SourceConfig,
    catalog: &C,
) -> (Vec<CreateRequest>, IngestionStatus) {
    let run = IngestionRun::prepare(backend, config, catalog).unwrap();
    let mut stream = run.into_stream();
    let requests: Vec<CreateRequest> = stream.by_ref().collect();
    (requests, stream.into_status())
}

/// Run the same scenario on both backends
fn run_both(config: &SourceConfig, catalog: &StaticCatalog) -> Vec<(&'static str, Vec<CreateRequest>, IngestionStatus)> {
    let api = fixtures::api();
    let db = fixtures::metadata_db();

    let (api_requests, api_status) = run(&ApiBackend::new(&api), config, catalog);
    let (db_requests, db_status) = run(&DbBackend::new(&db), config, catalog);

    vec![("api", api_requests, api_status), ("db", db_requests, db_status)]
}

fn kinds(requests: &[CreateRequest]) -> Vec<&'static str> {
    requests.iter().map(CreateRequest::kind).collect()
}

fn dashboard<'r>(requests: &'r [CreateRequest], name: &str) -> Option<&'r dashmeta_core::CreateDashboardRequest> {
    requests
        .iter()
        .filter_map(CreateRequest::as_dashboard)
        .find(|d| d.name == name)
}

// =============================================================================
// Minimal end-to-end scenario
// =============================================================================

#[test]
fn single_dashboard_single_chart() {
    let api = InMemoryApi::new()
        .with_chart(ApiChart {
            id: Some("42".into()),
            slice_name: Some("Revenue".into()),
            viz_type: Some("line".into()),
            datasource_id: Some("3".into()),
            url: Some("/explore/?slice_id=42".into()),
            ..ApiChart::default()
        })
        .with_dashboard(ApiDashboard {
            id: "7".into(),
            dashboard_title: Some("Sales".into()),
            position_json: Some(fixtures::layout(&[42])),
            ..ApiDashboard::default()
        })
        .with_datasource(DatasourceResponse {
            id: "3".into(),
            result: DatasourceResult {
                table_name: Some("orders".into()),
                schema: Some("public".into()),
                database: DatabaseRef::default(),
                columns: fixtures::orders_columns(),
            },
        });

    let config = fixtures::source_config();
    let (requests, status) = run(&ApiBackend::new(&api), &config, &StaticCatalog::new());

    assert_eq!(kinds(&requests), vec!["chart", "data_model", "dashboard", "lineage"]);

    let chart = requests[0].as_chart().unwrap();
    assert_eq!(chart.name, "42");
    assert_eq!(chart.chart_type, ChartType::Other);

    let model = requests[1].as_data_model().unwrap();
    assert_eq!(model.name, "3");
    assert_eq!(model.display_name, "orders");

    let dashboard = requests[2].as_dashboard().unwrap();
    assert_eq!(dashboard.name, "7");
    assert_eq!(dashboard.display_name.as_deref(), Some("Sales"));
    assert_eq!(dashboard.charts, vec!["superset.42"]);

    let edge = requests[3].as_lineage().unwrap();
    assert_eq!(edge.from.entity_type, EntityType::DashboardDataModel);
    assert_eq!(edge.from.fqn, "superset.model.3");
    assert_eq!(edge.to.entity_type, EntityType::Dashboard);
    assert_eq!(edge.to.fqn, "superset.7");

    assert!(!status.has_failures());
}

// =============================================================================
// Shared fixture, both backends
// =============================================================================

#[test]
fn emission_order_per_dashboard() {
    for (backend, requests, _) in run_both(&fixtures::source_config(), &fixtures::catalog()) {
        // dashboard 7: three charts, two data models, dashboard, two edges
        // dashboard 8: one chart, dashboard
        assert_eq!(
            kinds(&requests),
            vec![
                "chart", "chart", "chart", "data_model", "data_model", "dashboard", "lineage",
                "lineage", "chart", "dashboard",
            ],
            "backend {}",
            backend
        );
    }
}

#[test]
fn dashboard_references_exactly_emitted_charts() {
    for (backend, requests, status) in run_both(&fixtures::source_config(), &fixtures::catalog()) {
        let sales = dashboard(&requests, "7").unwrap();
        assert_eq!(
            sales.charts,
            vec!["superset.42", "superset.43", "superset.44"],
            "backend {}",
            backend
        );

        let emitted: Vec<String> = requests
            .iter()
            .filter_map(CreateRequest::as_chart)
            .map(|c| format!("superset.{}", c.name))
            .collect();
        assert!(sales.charts.iter().all(|fqn| emitted.contains(fqn)));

        // chart 99 is in the layout but not in the cache
        assert!(status.skipped.iter().any(|s| s.name == "99"), "backend {}", backend);
    }
}

#[test]
fn data_models_deduplicated_per_dashboard() {
    for (backend, requests, _) in run_both(&fixtures::source_config(), &fixtures::catalog()) {
        let models: Vec<&str> = requests
            .iter()
            .filter_map(CreateRequest::as_data_model)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(models, vec!["3", "5"], "backend {}", backend);
    }
}

#[test]
fn unparsable_column_type_is_kept_as_unknown() {
    for (backend, requests, _) in run_both(&fixtures::source_config(), &fixtures::catalog()) {
        let orders = requests
            .iter()
            .filter_map(CreateRequest::as_data_model)
            .find(|m| m.display_name == "orders")
            .unwrap();

        assert_eq!(orders.columns.len(), 3, "backend {}", backend);
        assert_eq!(orders.columns[0].data_type, DataType::Bigint);
        assert_eq!(orders.columns[1].data_type, DataType::Varchar);
        assert_eq!(orders.columns[1].data_length, Some(45));
        assert_eq!(orders.columns[2].data_type, DataType::Unknown);
        assert_eq!(orders.columns[2].data_type_display.as_deref(), Some("GEOGRAPHY(POINT,,"));
    }
}

#[test]
fn source_urls_per_backend() {
    let results = run_both(&fixtures::source_config(), &fixtures::catalog());

    let (_, api_requests, _) = &results[0];
    assert_eq!(
        dashboard(api_requests, "7").unwrap().source_url,
        "http://superset.local:8088/superset/dashboard/sales/"
    );

    let (_, db_requests, _) = &results[1];
    assert_eq!(
        dashboard(db_requests, "7").unwrap().source_url,
        "http://superset.local:8088/superset/dashboard/7/"
    );

    for (_, requests, _) in &results {
        let revenue = requests.iter().filter_map(CreateRequest::as_chart).find(|c| c.name == "42").unwrap();
        assert_eq!(revenue.source_url, "http://superset.local:8088/explore/?slice_id=42");
    }
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn filtered_data_model_has_no_entity_and_no_edge() {
    let config = SourceConfig {
        data_model_filter_pattern: FilterPattern {
            includes: Vec::new(),
            excludes: vec!["tmp_".into()],
        },
        ..fixtures::source_config()
    };

    for (backend, requests, status) in run_both(&config, &fixtures::catalog()) {
        assert!(
            !requests
                .iter()
                .filter_map(CreateRequest::as_data_model)
                .any(|m| m.display_name == "tmp_scratch"),
            "backend {}",
            backend
        );
        assert!(!requests
            .iter()
            .filter_map(CreateRequest::as_lineage)
            .any(|e| e.from.fqn == "superset.model.5"));
        assert!(status.filtered.iter().any(|f| f.name == "tmp_scratch"));
    }
}

#[test]
fn filtered_dashboard_emits_nothing() {
    let config = SourceConfig {
        dashboard_filter_pattern: FilterPattern {
            includes: Vec::new(),
            excludes: vec!["tmp".into()],
        },
        ..fixtures::source_config()
    };

    for (_, requests, status) in run_both(&config, &fixtures::catalog()) {
        assert!(dashboard(&requests, "8").is_none());
        assert!(!requests.iter().filter_map(CreateRequest::as_chart).any(|c| c.name == "45"));
        assert!(status.filtered.iter().any(|f| f.name == "tmp drafts"));
    }
}

#[test]
fn filtered_chart_is_not_referenced() {
    let config = SourceConfig {
        chart_filter_pattern: FilterPattern {
            includes: Vec::new(),
            excludes: vec!["scratch".into()],
        },
        ..fixtures::source_config()
    };

    for (_, requests, _) in run_both(&config, &fixtures::catalog()) {
        let sales = dashboard(&requests, "7").unwrap();
        assert_eq!(sales.charts, vec!["superset.42", "superset.43"]);
        // its datasource is not visited either
        assert!(!requests.iter().filter_map(CreateRequest::as_data_model).any(|m| m.name == "5"));
    }
}

#[test]
fn data_models_can_be_disabled() {
    let config = SourceConfig {
        include_data_models: false,
        ..fixtures::source_config()
    };

    for (_, requests, _) in run_both(&config, &fixtures::catalog()) {
        assert_eq!(kinds(&requests), vec!["chart", "chart", "chart", "dashboard", "chart", "dashboard"]);
    }
}

// =============================================================================
// Table lineage
// =============================================================================

fn table_edges(requests: &[CreateRequest]) -> Vec<String> {
    requests
        .iter()
        .filter_map(CreateRequest::as_lineage)
        .filter(|e| e.from.entity_type == EntityType::Table)
        .map(|e| format!("{} -> {}", e.from.fqn, e.to.fqn))
        .collect()
}

#[test]
fn table_lineage_from_backend_database() {
    for (backend, requests, _) in run_both(&fixtures::lineage_config(), &fixtures::catalog()) {
        assert_eq!(
            table_edges(&requests),
            vec![
                "warehouse.sales.public.orders -> superset.7",
                "warehouse.sales.public.orders -> superset.7",
                "warehouse.sales.public.tmp_scratch -> superset.7",
            ],
            "backend {}",
            backend
        );
    }
}

#[test]
fn service_database_name_overrides_backend_default() {
    let catalog = StaticCatalog::new()
        .with_service(DatabaseService::new("warehouse").with_database_name("analytics"));

    for (_, requests, _) in run_both(&fixtures::lineage_config(), &catalog) {
        let edges = table_edges(&requests);
        assert!(!edges.is_empty());
        assert!(edges.iter().all(|e| e.starts_with("warehouse.analytics.public.")));
    }
}

#[test]
fn tables_unknown_to_catalog_get_no_edge() {
    let catalog = fixtures::catalog().with_table("warehouse.sales.public.orders");

    for (_, requests, _) in run_both(&fixtures::lineage_config(), &catalog) {
        let edges = table_edges(&requests);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.starts_with("warehouse.sales.public.orders")));
    }
}

#[test]
fn unknown_database_service_warns_once_per_dashboard() {
    let config = SourceConfig {
        db_service_names: vec!["lake".into()],
        ..fixtures::source_config()
    };

    for (_, requests, status) in run_both(&config, &fixtures::catalog()) {
        assert!(table_edges(&requests).is_empty());
        assert_eq!(status.summary.warnings, 2);
        assert!(!status.has_failures());
    }
}

// =============================================================================
// Failure isolation and laziness
// =============================================================================

#[test]
fn failing_datasource_does_not_stop_siblings() {
    let api = fixtures::api().with_error(
        ApiCall::Datasource("3".into()),
        FetchError::PermissionDenied("dataset 3".into()),
    );
    let (requests, status) = run(&ApiBackend::new(&api), &fixtures::source_config(), &fixtures::catalog());

    let models: Vec<&str> = requests
        .iter()
        .filter_map(CreateRequest::as_data_model)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(models, vec!["5"]);
    assert!(dashboard(&requests, "7").is_some());
    assert!(status.failures.iter().any(|f| f.name == "42"));
    assert!(status.failures[0].stack_trace.is_some());
}

#[test]
fn failing_column_query_fails_only_that_model() {
    let db = fixtures::metadata_db().with_error(
        MetadataQuery::columns_of("orders"),
        FetchError::QueryError("relation \"table_columns\" does not exist".into()),
    );
    let (requests, status) = run(&DbBackend::new(&db), &fixtures::source_config(), &fixtures::catalog());

    let models: Vec<&str> = requests
        .iter()
        .filter_map(CreateRequest::as_data_model)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(models, vec!["5"]);
    assert_eq!(status.summary.failed, 1);
    assert_eq!(status.failures[0].name, "3");
}

#[test]
fn lost_chart_page_leaves_charts_out() {
    let api = fixtures::api().with_error(ApiCall::ChartsPage(0), FetchError::NetworkError("reset".into()));
    let (requests, status) = run(&ApiBackend::new(&api), &fixtures::source_config(), &fixtures::catalog());

    assert!(requests.iter().filter_map(CreateRequest::as_chart).next().is_none());
    assert_eq!(dashboard(&requests, "7").unwrap().charts, Vec::<String>::new());
    assert!(status.has_failures());
}

#[test]
fn lost_dashboard_listing_is_reported() {
    let db = fixtures::metadata_db().with_error(MetadataQuery::Dashboards, FetchError::QueryError("timeout".into()));
    let (requests, status) = run(&DbBackend::new(&db), &fixtures::source_config(), &fixtures::catalog());

    assert!(requests.is_empty());
    assert_eq!(status.failures[0].name, "dashboard listing");
}

#[test]
fn stream_is_lazy_per_dashboard() {
    let mut api = InMemoryApi::new().with_call_log();
    for i in 0..30 {
        api = api.with_dashboard(ApiDashboard {
            id: i.to_string(),
            dashboard_title: Some(format!("Dashboard {}", i)),
            ..ApiDashboard::default()
        });
    }
    let backend = ApiBackend::new(&api);
    let config = fixtures::source_config();
    let catalog = StaticCatalog::new();

    let mut stream = IngestionRun::prepare(&backend, &config, &catalog).unwrap().into_stream();
    let first = stream.next().unwrap();
    assert_eq!(first.as_dashboard().unwrap().name, "0");
    assert_eq!(api.count_calls(|c| matches!(c, ApiCall::DashboardsPage(1))), 0);

    assert_eq!(stream.by_ref().count(), 29);
    assert_eq!(api.count_calls(|c| matches!(c, ApiCall::DashboardsPage(1))), 1);
    assert!(stream.next().is_none());
}

#[test]
fn status_counts_scanned_entities() {
    for (_, requests, status) in run_both(&fixtures::source_config(), &fixtures::catalog()) {
        let entities = requests.iter().filter(|r| r.kind() != "lineage").count();
        assert_eq!(status.summary.scanned, entities);
        assert!(status.scanned.iter().any(|s| s == "Dashboard Scanned: Sales"));
        assert!(status.to_json().unwrap().contains("\"summary\""));
    }
}
