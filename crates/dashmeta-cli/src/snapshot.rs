//! Snapshot files: a recorded Superset deployment served from memory

use dashmeta_core::BackendKind;
use dashmeta_superset::{ApiBackend, DbBackend, InMemoryApi, InMemoryMetadataDb, SupersetBackend};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {backend} snapshot {path}: {source}")]
    Parse {
        backend: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a snapshot as the backend `kind` expects it
pub fn load_backend(path: &Path, kind: BackendKind) -> Result<Box<dyn SupersetBackend>, SnapshotError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let backend: Box<dyn SupersetBackend> = match kind {
        BackendKind::Api => {
            let api = InMemoryApi::from_json(&contents).map_err(|source| SnapshotError::Parse {
                backend: "api",
                path: path.display().to_string(),
                source,
            })?;
            tracing::debug!(charts = api.chart_count(), dashboards = api.dashboard_count(), "loaded api snapshot");
            Box::new(ApiBackend::new(api))
        }
        BackendKind::Db => {
            let db = InMemoryMetadataDb::from_json(&contents).map_err(|source| SnapshotError::Parse {
                backend: "db",
                path: path.display().to_string(),
                source,
            })?;
            Box::new(DbBackend::new(db))
        }
    };

    Ok(backend)
}
