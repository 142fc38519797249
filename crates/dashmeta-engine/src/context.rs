//! Per-dashboard processing context
//!
//! Holds what has been built for the dashboard currently being processed so
//! later steps (the dashboard itself, lineage) reference exactly the
//! entities emitted before them.

use dashmeta_core::{fqn, FqnError};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ProcessingContext {
    /// Dashboard service name, first part of every FQN built here
    service_name: String,

    service_fqn: String,

    dashboard_fqn: Option<String>,

    /// (chart id, chart FQN) in emission order
    charts: Vec<(String, String)>,

    /// (datasource id, data model FQN) in emission order
    data_models: Vec<(String, String)>,

    /// Datasources already handled for this dashboard, built or not
    seen_datasources: HashSet<String>,
}

impl ProcessingContext {
    pub fn new(service_name: impl Into<String>) -> Result<Self, FqnError> {
        let service_name = service_name.into();
        if service_name.trim().is_empty() {
            return Err(FqnError::EmptyServiceName);
        }
        let service_fqn = fqn::quote_name(&service_name)?;

        Ok(Self {
            service_name,
            service_fqn,
            dashboard_fqn: None,
            charts: Vec::new(),
            data_models: Vec::new(),
            seen_datasources: HashSet::new(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// FQN of the dashboard service
    pub fn service_fqn(&self) -> &str {
        &self.service_fqn
    }

    /// Start a new dashboard scope, forgetting the previous dashboard
    pub fn begin_dashboard(&mut self, dashboard_id: &str) -> Result<&str, FqnError> {
        self.dashboard_fqn = None;
        self.charts.clear();
        self.data_models.clear();
        self.seen_datasources.clear();

        let dashboard_fqn = fqn::dashboard(&self.service_name, dashboard_id)?;
        Ok(self.dashboard_fqn.insert(dashboard_fqn).as_str())
    }

    pub fn dashboard_fqn(&self) -> Option<&str> {
        self.dashboard_fqn.as_deref()
    }

    /// Record an emitted chart and return its FQN
    pub fn register_chart(&mut self, chart_id: &str) -> Result<String, FqnError> {
        let chart_fqn = fqn::chart(&self.service_name, chart_id)?;
        self.charts.push((chart_id.to_string(), chart_fqn.clone()));
        Ok(chart_fqn)
    }

    /// Ids of the charts emitted for this dashboard
    pub fn chart_ids(&self) -> Vec<String> {
        self.charts.iter().map(|(id, _)| id.clone()).collect()
    }

    /// FQNs of the charts emitted for this dashboard
    pub fn chart_fqns(&self) -> Vec<String> {
        self.charts.iter().map(|(_, fqn)| fqn.clone()).collect()
    }

    /// Mark a datasource as handled; `false` if it already was
    pub fn claim_datasource(&mut self, datasource_id: &str) -> bool {
        self.seen_datasources.insert(datasource_id.to_string())
    }

    /// Record an emitted data model and return its FQN
    pub fn register_data_model(&mut self, datasource_id: &str) -> Result<String, FqnError> {
        let model_fqn = fqn::data_model(&self.service_name, datasource_id)?;
        self.data_models.push((datasource_id.to_string(), model_fqn.clone()));
        Ok(model_fqn)
    }

    /// FQNs of the data models emitted for this dashboard
    pub fn data_model_fqns(&self) -> Vec<String> {
        self.data_models.iter().map(|(_, fqn)| fqn.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_service() {
        assert!(ProcessingContext::new("  ").is_err());
    }

    #[test]
    fn dashboard_scope_resets() {
        let mut ctx = ProcessingContext::new("superset").unwrap();

        assert_eq!(ctx.begin_dashboard("7").unwrap(), "superset.7");
        ctx.register_chart("42").unwrap();
        assert!(ctx.claim_datasource("3"));
        ctx.register_data_model("3").unwrap();

        assert_eq!(ctx.chart_fqns(), vec!["superset.42"]);
        assert_eq!(ctx.data_model_fqns(), vec!["superset.model.3"]);
        assert!(!ctx.claim_datasource("3"));

        ctx.begin_dashboard("8").unwrap();
        assert_eq!(ctx.dashboard_fqn(), Some("superset.8"));
        assert!(ctx.chart_fqns().is_empty());
        assert!(ctx.data_model_fqns().is_empty());
        assert!(ctx.claim_datasource("3"));
    }

    #[test]
    fn dotted_service_is_quoted() {
        let ctx = ProcessingContext::new("prod.superset").unwrap();
        assert_eq!(ctx.service_fqn(), "\"prod.superset\"");
    }
}
