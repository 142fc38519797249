//! Include/exclude name filters for dashboards, charts and data models

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Filter pattern as written in configuration
///
/// Patterns are regular expressions matched case-insensitively against the
/// start of a name. A name is filtered out when `includes` is non-empty and
/// none of them match, or when any of `excludes` matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPattern {
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

impl FilterPattern {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Compile into a [`NameFilter`]
    pub fn compile(&self) -> Result<NameFilter, FilterError> {
        Ok(NameFilter {
            includes: compile_all(&self.includes)?,
            excludes: compile_all(&self.excludes)?,
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("(?i)^(?:{})", pattern)).map_err(|e| FilterError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Compiled filter
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
}

impl NameFilter {
    /// Filter that lets everything through
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Whether `name` should be skipped
    pub fn is_filtered(&self, name: &str) -> bool {
        if !self.includes.is_empty() && !self.includes.iter().any(|re| re.is_match(name)) {
            return true;
        }
        self.excludes.iter().any(|re| re.is_match(name))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
