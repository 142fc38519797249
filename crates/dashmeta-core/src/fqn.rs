//! Fully-qualified name construction
//!
//! The naming authority: deterministic joins of hierarchy context into the
//! dotted identifiers the catalog uses as join keys. Name parts containing a
//! `.` are wrapped in double quotes so the join stays reversible.

/// Separator between FQN parts
pub const SEPARATOR: char = '.';

/// Errors raised when an FQN cannot be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FqnError {
    #[error("Service name must not be empty")]
    EmptyServiceName,

    #[error("Missing {0} name")]
    MissingPart(&'static str),

    #[error("Name part contains a double quote: {0}")]
    InvalidPart(String),
}

/// Quote a single name part if it contains the separator
pub fn quote_name(name: &str) -> Result<String, FqnError> {
    if name.starts_with('"') && name.ends_with('"') && name.len() > 1 {
        return Ok(name.to_string());
    }
    if name.contains('"') {
        return Err(FqnError::InvalidPart(name.to_string()));
    }
    if name.contains(SEPARATOR) {
        Ok(format!("\"{}\"", name))
    } else {
        Ok(name.to_string())
    }
}

/// Split an FQN back into its parts, honouring quotes
pub fn split(fqn: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in fqn.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                current.push(ch);
            }
            SEPARATOR if !quoted => parts.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    parts.push(current);
    parts
}

fn join(service: &str, parts: &[(&'static str, Option<&str>)]) -> Result<String, FqnError> {
    if service.trim().is_empty() {
        return Err(FqnError::EmptyServiceName);
    }

    let mut fqn = quote_name(service)?;
    for (label, part) in parts {
        let part = part
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(FqnError::MissingPart(label))?;
        fqn.push(SEPARATOR);
        fqn.push_str(&quote_name(part)?);
    }
    Ok(fqn)
}

/// `service.database.schema.table`
pub fn table(
    service: &str,
    database: Option<&str>,
    schema: Option<&str>,
    table: Option<&str>,
) -> Result<String, FqnError> {
    join(
        service,
        &[("database", database), ("schema", schema), ("table", table)],
    )
}

/// `service.chart`
pub fn chart(service: &str, chart: &str) -> Result<String, FqnError> {
    join(service, &[("chart", Some(chart))])
}

/// `service.dashboard`
pub fn dashboard(service: &str, dashboard: &str) -> Result<String, FqnError> {
    join(service, &[("dashboard", Some(dashboard))])
}

/// `service.model.data_model`
pub fn data_model(service: &str, data_model: &str) -> Result<String, FqnError> {
    join(service, &[("model", Some("model")), ("data model", Some(data_model))])
}
