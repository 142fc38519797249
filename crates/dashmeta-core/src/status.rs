//! Run status report (stable v1)
//!
//! Every construction step returns an [`Outcome`]; the run folds outcomes
//! into an [`IngestionStatus`] that lists what was scanned, filtered,
//! skipped and what failed.

use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A failed entity with its diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Name of the entity that failed
    pub name: String,

    /// Human-readable message
    pub error: String,

    /// Error source chain, outermost first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl Failure {
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            stack_trace: None,
        }
    }

    /// Build from an error, rendering its source chain as the diagnostic
    pub fn from_error(name: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = vec![format!("{:?}", error)];
        let mut source = error.source();
        while let Some(cause) = source {
            trace.push(format!("caused by: {}", cause));
            source = cause.source();
        }

        Self {
            name: name.into(),
            error: error.to_string(),
            stack_trace: Some(trace.join("\n")),
        }
    }
}

/// Result of one construction step
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Entity built and ready to emit
    Built(T),

    /// Entity excluded by a configured filter
    Filtered { name: String, reason: String },

    /// Entity not built because an input was missing
    Skipped { name: String, reason: String },

    /// Entity construction failed
    Failed(Failure),
}

impl<T> Outcome<T> {
    pub fn filtered(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Filtered {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Skipped {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    /// The built value, if any
    pub fn built(self) -> Option<T> {
        match self {
            Self::Built(value) => Some(value),
            _ => None,
        }
    }
}

/// A name with the reason it was left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub name: String,
    pub reason: String,
}

/// Summary counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub scanned: usize,
    pub filtered: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub failed: usize,
}

/// Status of one ingestion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionStatus {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    pub summary: StatusSummary,

    /// Labels of every entity emitted
    pub scanned: Vec<String>,

    pub filtered: Vec<StatusEntry>,

    pub skipped: Vec<StatusEntry>,

    /// Run-level problems that did not stop any entity
    pub warnings: Vec<String>,

    pub failures: Vec<Failure>,
}

impl IngestionStatus {
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: StatusSummary::default(),
            scanned: Vec::new(),
            filtered: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn scanned(&mut self, label: impl Into<String>) {
        self.summary.scanned += 1;
        self.scanned.push(label.into());
    }

    pub fn filter(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.summary.filtered += 1;
        self.filtered.push(StatusEntry {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.summary.skipped += 1;
        self.skipped.push(StatusEntry {
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.summary.warnings += 1;
        self.warnings.push(message.into());
    }

    pub fn failed(&mut self, failure: Failure) {
        self.summary.failed += 1;
        self.failures.push(failure);
    }

    /// Fold an outcome into the report, returning the built value
    ///
    /// Built values are not counted as scanned here: they are counted when
    /// they are actually emitted.
    pub fn record<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Outcome::Built(value) => Some(value),
            Outcome::Filtered { name, reason } => {
                self.filter(name, reason);
                None
            }
            Outcome::Skipped { name, reason } => {
                self.skip(name, reason);
                None
            }
            Outcome::Failed(failure) => {
                self.failed(failure);
                None
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for IngestionStatus {
    fn default() -> Self {
        Self::new()
    }
}
