//! Superset instances shared by the pipeline tests
//!
//! The same small Superset deployment is described twice, once as REST API
//! responses and once as metadata-database rows:
//!
//! - dashboard `7` "Sales": charts `42` (viz `line`) and `43` (bar) on
//!   `public.orders`, chart `44` on `public.tmp_scratch`, and a layout entry
//!   for chart `99` that no longer exists
//! - dashboard `8` "tmp drafts": chart `45`, no datasource
//!
//! `public.orders` has three columns, one with a type nobody can parse.

#![allow(dead_code)]

use dashmeta_core::{Config, DatabaseService, SourceConfig, StaticCatalog};
use dashmeta_superset::models::{
    ApiChart, ApiDashboard, ChartRow, DashboardRow, DatabaseParameters, DatabaseRef,
    DatabaseResponse, DatabaseResult, DatasourceResponse, DatasourceResult,
};
use dashmeta_superset::{ColumnRecord, InMemoryApi, InMemoryMetadataDb};

pub const HOST: &str = "http://superset.local:8088";

pub fn layout(chart_ids: &[u64]) -> String {
    let mut layout = serde_json::Map::new();
    layout.insert("ROOT_ID".into(), serde_json::json!({"type": "ROOT"}));
    for id in chart_ids {
        layout.insert(
            format!("CHART-{}", id),
            serde_json::json!({"type": "CHART", "meta": {"chartId": id}}),
        );
    }
    serde_json::Value::Object(layout).to_string()
}

pub fn orders_columns() -> Vec<ColumnRecord> {
    vec![
        ColumnRecord::new("10", "id", Some("BIGINT")),
        ColumnRecord::new("11", "customer", Some("VARCHAR(45)")),
        ColumnRecord::new("12", "shape", Some("GEOGRAPHY(POINT,,")),
    ]
}

fn api_chart(id: &str, name: &str, viz: &str, datasource: Option<&str>) -> ApiChart {
    ApiChart {
        id: Some(id.into()),
        slice_name: Some(name.into()),
        description: None,
        viz_type: Some(viz.into()),
        datasource_id: datasource.map(str::to_string),
        url: Some(format!("/explore/?slice_id={}", id)),
    }
}

fn datasource(id: &str, table: &str, columns: Vec<ColumnRecord>) -> DatasourceResponse {
    DatasourceResponse {
        id: id.into(),
        result: DatasourceResult {
            table_name: Some(table.into()),
            schema: Some("public".into()),
            database: DatabaseRef {
                id: Some("1".into()),
                database_name: Some("examples".into()),
            },
            columns,
        },
    }
}

/// The deployment as REST API responses
pub fn api() -> InMemoryApi {
    InMemoryApi::new()
        .with_chart(api_chart("42", "Revenue", "line", Some("3")))
        .with_chart(api_chart("43", "Orders per day", "echarts_timeseries_bar", Some("3")))
        .with_chart(api_chart("44", "Scratch", "table", Some("5")))
        .with_chart(api_chart("45", "Notes", "markup", None))
        .with_dashboard(ApiDashboard {
            id: "7".into(),
            dashboard_title: Some("Sales".into()),
            url: Some("/superset/dashboard/sales/".into()),
            position_json: Some(layout(&[42, 43, 44, 99])),
            published: Some(true),
        })
        .with_dashboard(ApiDashboard {
            id: "8".into(),
            dashboard_title: Some("tmp drafts".into()),
            url: Some("/superset/dashboard/8/".into()),
            position_json: Some(layout(&[45])),
            published: Some(false),
        })
        .with_datasource(datasource("3", "orders", orders_columns()))
        .with_datasource(datasource(
            "5",
            "tmp_scratch",
            vec![ColumnRecord::new("20", "note", Some("TEXT"))],
        ))
        .with_database(DatabaseResponse {
            id: "1".into(),
            result: DatabaseResult {
                database_name: Some("examples".into()),
                parameters: Some(DatabaseParameters {
                    database: Some("sales".into()),
                    ..DatabaseParameters::default()
                }),
                sqlalchemy_uri: Some("postgresql://superset@db:5432/sales".into()),
            },
        })
}

fn chart_row(id: &str, name: &str, viz: &str, datasource: Option<(&str, &str)>) -> ChartRow {
    ChartRow {
        id: id.into(),
        slice_name: Some(name.into()),
        description: None,
        viz_type: Some(viz.into()),
        datasource_id: datasource.map(|(id, _)| id.to_string()),
        table_name: datasource.map(|(_, table)| table.to_string()),
        schema: datasource.map(|_| "public".to_string()),
        database_name: datasource.map(|_| "examples".to_string()),
        sqlalchemy_uri: datasource.map(|_| "postgresql://superset@db:5432/sales".to_string()),
    }
}

/// The deployment as metadata-database rows
pub fn metadata_db() -> InMemoryMetadataDb {
    let mut db = InMemoryMetadataDb::new()
        .with_chart(chart_row("42", "Revenue", "line", Some(("3", "orders"))))
        .with_chart(chart_row("43", "Orders per day", "echarts_timeseries_bar", Some(("3", "orders"))))
        .with_chart(chart_row("44", "Scratch", "table", Some(("5", "tmp_scratch"))))
        .with_chart(chart_row("45", "Notes", "markup", None))
        .with_dashboard(DashboardRow {
            id: "7".into(),
            dashboard_title: Some("Sales".into()),
            position_json: Some(layout(&[42, 43, 44, 99])),
        })
        .with_dashboard(DashboardRow {
            id: "8".into(),
            dashboard_title: Some("tmp drafts".into()),
            position_json: Some(layout(&[45])),
        })
        .with_column("tmp_scratch", ColumnRecord::new("20", "note", Some("TEXT")));

    for column in orders_columns() {
        db = db.with_column("orders", column);
    }
    db
}

pub fn source_config() -> SourceConfig {
    SourceConfig {
        service_name: "superset".into(),
        host_port: format!("{}/", HOST),
        ..SourceConfig::default()
    }
}

/// Source config with table lineage against `warehouse`
pub fn lineage_config() -> SourceConfig {
    SourceConfig {
        db_service_names: vec!["warehouse".into()],
        ..source_config()
    }
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new().with_service(DatabaseService::new("warehouse"))
}

pub fn config_from_toml(toml: &str) -> Config {
    Config::from_toml(toml).unwrap()
}
