//! JSON snapshots of a small Superset deployment
//!
//! These are the same documents the CLI accepts with `--snapshot`: one for
//! the REST API backend and one for the metadata database backend. Both
//! describe dashboard 7 "Sales" holding charts 42 and 43 on `public.orders`.

#![allow(dead_code)]

pub const API_SNAPSHOT: &str = r#"{
    "charts": [
        {"id": 42, "slice_name": "Revenue", "viz_type": "line", "datasource_id": 3,
         "url": "/explore/?slice_id=42"},
        {"id": 43, "slice_name": "Orders per day", "viz_type": "echarts_timeseries_bar",
         "datasource_id": 3, "url": "/explore/?slice_id=43"}
    ],
    "dashboards": [
        {"id": 7, "dashboard_title": "Sales", "url": "/superset/dashboard/7/",
         "position_json": "{\"CHART-a\": {\"type\": \"CHART\", \"meta\": {\"chartId\": 42}}, \"CHART-b\": {\"type\": \"CHART\", \"meta\": {\"chartId\": 43}}}"}
    ],
    "datasources": [
        {"id": 3, "result": {
            "table_name": "orders",
            "schema": "public",
            "database": {"id": 1},
            "columns": [
                {"id": 10, "column_name": "id", "type": "BIGINT"},
                {"id": 11, "column_name": "customer", "type": "VARCHAR(45)"},
                {"id": 12, "column_name": "total", "type": "NUMERIC(10,2)"}
            ]
        }}
    ],
    "databases": [
        {"id": 1, "result": {"database_name": "examples", "parameters": {"database": "sales"}}}
    ]
}"#;

pub const DB_SNAPSHOT: &str = r#"{
    "charts": [
        {"id": 42, "slice_name": "Revenue", "viz_type": "line", "datasource_id": 3,
         "table_name": "orders", "schema": "public",
         "sqlalchemy_uri": "postgresql://superset@db:5432/sales"},
        {"id": 43, "slice_name": "Orders per day", "viz_type": "echarts_timeseries_bar",
         "datasource_id": 3, "table_name": "orders", "schema": "public",
         "sqlalchemy_uri": "postgresql://superset@db:5432/sales"}
    ],
    "dashboards": [
        {"id": 7, "dashboard_title": "Sales",
         "position_json": "{\"CHART-a\": {\"type\": \"CHART\", \"meta\": {\"chartId\": 42}}, \"CHART-b\": {\"type\": \"CHART\", \"meta\": {\"chartId\": 43}}}"}
    ],
    "columns": [
        {"id": 10, "table_name": "orders", "column_name": "id", "type": "BIGINT"},
        {"id": 11, "table_name": "orders", "column_name": "customer", "type": "VARCHAR(45)"},
        {"id": 12, "table_name": "orders", "column_name": "total", "type": "NUMERIC(10,2)"}
    ]
}"#;
