//! Table resolution for lineage
//!
//! Walks chart → datasource → owning database and asks the naming
//! authority for the table FQN in a given database service. Every missing
//! link yields `None`; nothing here is cached, so calls are repeatable.

use crate::backend::SupersetBackend;
use crate::models::{ChartRecord, DatasourceRef};
use dashmeta_core::{fqn, DatabaseService};

/// FQN of the table `chart` reads from, within `service`
pub fn resolve_table_fqn<B: SupersetBackend + ?Sized>(
    backend: &B,
    chart: &ChartRecord,
    service: &DatabaseService,
) -> Option<String> {
    match backend.datasource(chart) {
        Ok(Some(datasource)) => resolve_datasource_table(backend, &datasource, service),
        Ok(None) => {
            tracing::debug!(chart_id = %chart.id, "chart has no table datasource");
            None
        }
        Err(e) => {
            tracing::warn!(chart_id = %chart.id, error = %e, "could not resolve chart datasource");
            None
        }
    }
}

/// FQN of the table behind `datasource`, within `service`
///
/// The service's declared database name wins over the database the
/// backend reports.
pub fn resolve_datasource_table<B: SupersetBackend + ?Sized>(
    backend: &B,
    datasource: &DatasourceRef,
    service: &DatabaseService,
) -> Option<String> {
    let backend_default = match backend.default_database(datasource) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(datasource_id = %datasource.id, error = %e, "could not resolve database name");
            return None;
        }
    };

    let database = service.database_for_lineage(backend_default.as_deref());

    match fqn::table(
        &service.name,
        database.as_deref(),
        datasource.schema.as_deref(),
        datasource.table_name.as_deref(),
    ) {
        Ok(table_fqn) => Some(table_fqn),
        Err(e) => {
            tracing::debug!(datasource_id = %datasource.id, service = %service.name, error = %e, "incomplete table reference");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FetchError;
    use crate::memory::{ApiCall, InMemoryApi, InMemoryMetadataDb};
    use crate::models::{
        ChartRow, DatabaseParameters, DatabaseRef, DatabaseResponse, DatabaseResult,
        DatasourceResponse, DatasourceResult,
    };
    use crate::{ApiBackend, DbBackend};

    fn api() -> InMemoryApi {
        InMemoryApi::new()
            .with_datasource(DatasourceResponse {
                id: "3".into(),
                result: DatasourceResult {
                    table_name: Some("orders".into()),
                    schema: Some("public".into()),
                    database: DatabaseRef {
                        id: Some("1".into()),
                        database_name: None,
                    },
                    columns: Vec::new(),
                },
            })
            .with_database(DatabaseResponse {
                id: "1".into(),
                result: DatabaseResult {
                    parameters: Some(DatabaseParameters {
                        database: Some("sales".into()),
                        ..DatabaseParameters::default()
                    }),
                    ..DatabaseResult::default()
                },
            })
    }

    fn chart(datasource_id: Option<&str>) -> ChartRecord {
        ChartRecord {
            datasource_id: datasource_id.map(str::to_string),
            ..ChartRecord::new("42")
        }
    }

    #[test]
    fn resolves_through_api() {
        let api = api();
        let backend = ApiBackend::new(&api);
        let service = DatabaseService::new("warehouse");

        assert_eq!(
            resolve_table_fqn(&backend, &chart(Some("3")), &service),
            Some("warehouse.sales.public.orders".to_string())
        );
    }

    #[test]
    fn service_database_overrides_backend() {
        let api = api();
        let backend = ApiBackend::new(&api);
        let service = DatabaseService::new("warehouse").with_database_name("analytics");

        assert_eq!(
            resolve_table_fqn(&backend, &chart(Some("3")), &service),
            Some("warehouse.analytics.public.orders".to_string())
        );
    }

    #[test]
    fn missing_links_resolve_to_none() {
        let api = api().with_error(ApiCall::Database("1".into()), FetchError::NetworkError("down".into()));
        let backend = ApiBackend::new(&api);
        let service = DatabaseService::new("warehouse");

        assert_eq!(resolve_table_fqn(&backend, &chart(None), &service), None);
        assert_eq!(resolve_table_fqn(&backend, &chart(Some("404")), &service), None);
        assert_eq!(resolve_table_fqn(&backend, &chart(Some("3")), &service), None);
    }

    #[test]
    fn resolution_is_repeatable() {
        let api = api();
        let backend = ApiBackend::new(&api);
        let service = DatabaseService::new("warehouse");
        let first = resolve_table_fqn(&backend, &chart(Some("3")), &service);
        let second = resolve_table_fqn(&backend, &chart(Some("3")), &service);
        assert_eq!(first, second);
    }

    #[test]
    fn resolves_through_metadata_db() {
        let db = InMemoryMetadataDb::new();
        let backend = DbBackend::new(&db);
        let service = DatabaseService::new("warehouse");

        let with_uri = ChartRecord::from(ChartRow {
            id: "42".into(),
            datasource_id: Some("3".into()),
            table_name: Some("orders".into()),
            schema: Some("public".into()),
            sqlalchemy_uri: Some("postgresql://u@h:5432/sales".into()),
            ..ChartRow::default()
        });
        assert_eq!(
            resolve_table_fqn(&backend, &with_uri, &service),
            Some("warehouse.sales.public.orders".to_string())
        );

        // No connection string and no override: database unknown
        let without_uri = ChartRecord::from(ChartRow {
            id: "43".into(),
            datasource_id: Some("4".into()),
            table_name: Some("orders".into()),
            schema: Some("public".into()),
            ..ChartRow::default()
        });
        assert_eq!(resolve_table_fqn(&backend, &without_uri, &service), None);

        let overridden = DatabaseService::new("warehouse").with_database_name("analytics");
        assert_eq!(
            resolve_table_fqn(&backend, &without_uri, &overridden),
            Some("warehouse.analytics.public.orders".to_string())
        );

        let malformed = ChartRecord::from(ChartRow {
            id: "44".into(),
            datasource_id: Some("5".into()),
            table_name: Some("orders".into()),
            schema: Some("public".into()),
            sqlalchemy_uri: Some("::::".into()),
            ..ChartRow::default()
        });
        assert_eq!(resolve_table_fqn(&backend, &malformed, &service), None);
    }
}
