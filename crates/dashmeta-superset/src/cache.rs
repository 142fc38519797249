//! Chart cache primed once per run
//!
//! Dashboards reference charts by id only. The cache holds every chart the
//! backend listed so dashboards can be processed without re-fetching.

use crate::backend::SupersetBackend;
use crate::models::ChartRecord;
use dashmeta_core::{Failure, IngestionStatus};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ChartCache {
    charts: HashMap<String, ChartRecord>,
}

impl ChartCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every chart the backend can list
    ///
    /// A page that cannot be fetched is recorded in `status` and the listing
    /// continues, leaving those charts out of the cache.
    pub fn prepare<B: SupersetBackend + ?Sized>(backend: &B, status: &mut IngestionStatus) -> Self {
        let mut cache = Self::new();

        for (index, page) in backend.chart_pages().enumerate() {
            match page {
                Ok(charts) => {
                    for chart in charts {
                        cache.insert(chart);
                    }
                }
                Err(e) => {
                    tracing::warn!(backend = backend.name(), page = index, error = %e, "chart page lost");
                    status.failed(Failure::from_error(format!("chart listing page {}", index), &e));
                }
            }
        }

        tracing::info!(backend = backend.name(), charts = cache.len(), "chart cache ready");
        cache
    }

    /// Insert a chart, replacing any earlier record with the same id
    pub fn insert(&mut self, chart: ChartRecord) {
        self.charts.insert(chart.id.clone(), chart);
    }

    pub fn get(&self, id: &str) -> Option<&ChartRecord> {
        self.charts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.charts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
