//! Canonical entity types and the create/lineage requests handed to the catalog

use serde::{Deserialize, Serialize};

/// Canonical column data type
///
/// Backend type strings are folded onto this set by
/// [`parse_column_type`](crate::types::parse_column_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Number,
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Float,
    Double,
    Decimal,
    Numeric,
    Money,
    Boolean,
    Char,
    Varchar,
    String,
    Text,
    Mediumtext,
    Binary,
    Varbinary,
    Bytea,
    Blob,
    Date,
    Datetime,
    Time,
    Timestamp,
    Timestampz,
    Interval,
    Year,
    Json,
    Uuid,
    Array,
    Map,
    Struct,
    Enum,
    Set,
    Geography,
    Geometry,
    Variant,
    Xml,
    Inet,
    Cidr,
    Bit,

    /// Catch-all for absent, unknown or unparsable type strings
    Unknown,
}

impl DataType {
    /// Whether a single parenthesized parameter is a length (`VARCHAR(45)`)
    /// rather than a precision (`NUMERIC(10)`)
    pub fn takes_length(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Varchar
                | Self::String
                | Self::Text
                | Self::Binary
                | Self::Varbinary
                | Self::Bit
        )
    }

    /// Whether parenthesized parameters are precision and scale
    pub fn takes_precision(&self) -> bool {
        matches!(
            self,
            Self::Decimal | Self::Numeric | Self::Number | Self::Float | Self::Double | Self::Money
        )
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_value(self).map_err(|_| std::fmt::Error)?;
        match json {
            serde_json::Value::String(s) => f.write_str(&s),
            _ => Err(std::fmt::Error),
        }
    }
}

/// Canonical chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    Line,
    Table,
    Bar,
    Area,
    Pie,
    Histogram,
    Scatter,
    Text,
    BoxPlot,
    SanKey,
    Gauge,
    Map,
    Graph,
    Heatmap,
    Timeline,
    Other,
}

impl Default for ChartType {
    fn default() -> Self {
        Self::Other
    }
}

/// Kind tag carried by every data model this connector produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataModelType {
    SupersetDataModel,
}

/// A column of a data model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Backend column identifier
    pub name: String,

    pub display_name: Option<String>,

    pub description: Option<String>,

    /// Canonical type
    pub data_type: DataType,

    /// The type string exactly as the backend reported it
    pub data_type_display: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u16>,
}

impl Column {
    /// Create a column with no display metadata
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            data_type,
            data_type_display: None,
            data_length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Set the raw type string
    pub fn with_type_display(mut self, raw: Option<String>) -> Self {
        self.data_type_display = raw;
        self
    }

    pub fn with_length(mut self, length: Option<u32>) -> Self {
        self.data_length = length;
        self
    }

    pub fn with_precision(mut self, precision: Option<u16>, scale: Option<u16>) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }
}

/// Entity kinds that can appear on either end of a lineage edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Table,
    Chart,
    Dashboard,
    DashboardDataModel,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Chart => write!(f, "chart"),
            Self::Dashboard => write!(f, "dashboard"),
            Self::DashboardDataModel => write!(f, "dashboardDataModel"),
        }
    }
}

/// Reference to a catalog entity by its FQN
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityReference {
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    pub fqn: String,
}

impl EntityReference {
    pub fn new(entity_type: EntityType, fqn: impl Into<String>) -> Self {
        Self {
            entity_type,
            fqn: fqn.into(),
        }
    }
}

impl std::fmt::Display for EntityReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.fqn)
    }
}

/// Request to create or update a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChartRequest {
    /// Backend chart id
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub chart_type: ChartType,
    pub source_url: String,

    /// FQN of the owning dashboard service
    pub service: String,
}

/// Request to create or update a dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboardRequest {
    /// Backend dashboard id
    pub name: String,
    pub display_name: Option<String>,
    pub source_url: String,

    /// FQNs of the charts emitted for this dashboard
    pub charts: Vec<String>,

    /// FQN of the owning dashboard service
    pub service: String,
}

/// Request to create or update a data model (virtual table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataModelRequest {
    /// Backend datasource id
    pub name: String,

    /// Backend table name
    pub display_name: String,
    pub service: String,
    pub columns: Vec<Column>,
    pub data_model_type: DataModelType,
}

/// Directed lineage edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLineageRequest {
    pub from: EntityReference,
    pub to: EntityReference,
}

impl AddLineageRequest {
    pub fn new(from: EntityReference, to: EntityReference) -> Self {
        Self { from, to }
    }
}

/// Anything the connector hands to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateRequest {
    Chart(CreateChartRequest),
    Dashboard(CreateDashboardRequest),
    DataModel(CreateDataModelRequest),
    Lineage(AddLineageRequest),
}

impl CreateRequest {
    /// Short label for logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chart(_) => "chart",
            Self::Dashboard(_) => "dashboard",
            Self::DataModel(_) => "data_model",
            Self::Lineage(_) => "lineage",
        }
    }

    pub fn as_chart(&self) -> Option<&CreateChartRequest> {
        match self {
            Self::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_dashboard(&self) -> Option<&CreateDashboardRequest> {
        match self {
            Self::Dashboard(dashboard) => Some(dashboard),
            _ => None,
        }
    }

    pub fn as_data_model(&self) -> Option<&CreateDataModelRequest> {
        match self {
            Self::DataModel(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_lineage(&self) -> Option<&AddLineageRequest> {
        match self {
            Self::Lineage(edge) => Some(edge),
            _ => None,
        }
    }
}
