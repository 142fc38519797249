//! dashmeta engine
//!
//! Turns what a [`SupersetBackend`](dashmeta_superset::SupersetBackend)
//! reports into catalog create requests:
//! - per-dashboard processing context
//! - chart, dashboard and data model translators
//! - lineage from data models and warehouse tables to dashboards
//! - the shared ingestion pipeline and its lazy request stream

pub mod context;
pub mod lineage;
pub mod pipeline;
pub mod translate;

pub use context::ProcessingContext;
pub use lineage::LineageBuilder;
pub use pipeline::{EngineError, IngestionRun, RequestStream};
pub use translate::{chart_type, BuildError};
