//! Column type inference
//!
//! Folds free-text type descriptions reported by BI backends (which echo
//! whatever the underlying warehouse said) onto the canonical [`DataType`]
//! set. Inference never fails: anything it cannot read becomes
//! [`DataType::Unknown`] so one odd column cannot sink its data model.

use crate::entity::DataType;
use serde::{Deserialize, Serialize};

/// Result of parsing a type string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedType {
    pub data_type: DataType,

    /// Declared length for character and binary types (`VARCHAR(45)`)
    pub data_length: Option<u32>,

    /// Declared precision for numeric types
    pub precision: Option<u16>,

    /// Declared scale for numeric types
    pub scale: Option<u16>,
}

impl ParsedType {
    /// The catch-all result
    pub fn unknown() -> Self {
        Self::of(DataType::Unknown)
    }

    fn of(data_type: DataType) -> Self {
        Self {
            data_type,
            data_length: None,
            precision: None,
            scale: None,
        }
    }
}

/// Parse an optional backend type string
///
/// Absent, blank, unknown or malformed input yields [`ParsedType::unknown`].
///
/// # Example
///
/// ```
/// use dashmeta_core::{parse_column_type, DataType};
///
/// let parsed = parse_column_type(Some("VARCHAR(45)"));
/// assert_eq!(parsed.data_type, DataType::Varchar);
/// assert_eq!(parsed.data_length, Some(45));
/// ```
pub fn parse_column_type(raw: Option<&str>) -> ParsedType {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ParsedType::unknown();
    };

    match parse_type_string(&raw.to_uppercase()) {
        Some(parsed) => parsed,
        None => {
            tracing::debug!(raw, "unrecognized column type, using catch-all");
            ParsedType::unknown()
        }
    }
}

fn parse_type_string(upper: &str) -> Option<ParsedType> {
    let (upper, is_array) = unwrap_type(upper);

    // Element type must still be readable
    let parsed = parse_base_type(upper)?;
    if is_array {
        return Some(ParsedType::of(DataType::Array));
    }
    Some(parsed)
}

/// Peel wrapper types and `[]` suffixes off, however deeply nested
///
/// Returns the innermost type and whether any `[]` suffix was seen.
fn unwrap_type(mut upper: &str) -> (&str, bool) {
    let mut is_array = false;

    loop {
        upper = upper.trim();

        // Wrapper types carry no information of their own
        let unwrapped = ["NULLABLE(", "LOWCARDINALITY("]
            .iter()
            .find_map(|wrapper| upper.strip_prefix(wrapper).and_then(|r| r.strip_suffix(')')));
        if let Some(inner) = unwrapped {
            upper = inner;
            continue;
        }

        if let Some(element) = upper.strip_suffix("[]") {
            is_array = true;
            upper = element;
            continue;
        }

        return (upper, is_array);
    }
}

fn parse_base_type(upper: &str) -> Option<ParsedType> {
    if let Some(open) = upper.find('<') {
        if !upper.ends_with('>') {
            return None;
        }
        return match upper[..open].trim() {
            "ARRAY" => Some(ParsedType::of(DataType::Array)),
            "MAP" => Some(ParsedType::of(DataType::Map)),
            "STRUCT" | "ROW" => Some(ParsedType::of(DataType::Struct)),
            _ => None,
        };
    }

    let (base, params) = match upper.find('(') {
        Some(open) => {
            let close = upper.rfind(')')?;
            if close < open {
                return None;
            }
            // `TIMESTAMP(6) WITH TIME ZONE` keeps its suffix
            let base = format!("{} {}", &upper[..open], &upper[close + 1..]);
            (base, Some(&upper[open + 1..close]))
        }
        None => (upper.to_string(), None),
    };

    let base = strip_modifiers(&base);
    let data_type = map_base_type(&base)?;
    let mut parsed = ParsedType::of(data_type);

    if let Some(params) = params {
        apply_params(&mut parsed, params)?;
    }

    Some(parsed)
}

/// Read the parenthesized parameter list
///
/// Returns `None` when the parameters are malformed for the type.
fn apply_params(parsed: &mut ParsedType, params: &str) -> Option<()> {
    let parts: Vec<&str> = params.split(',').map(str::trim).collect();

    if parsed.data_type.takes_length() {
        match parts.as_slice() {
            ["MAX"] => {}
            [length] => parsed.data_length = Some(length.parse().ok()?),
            _ => return None,
        }
    } else if parsed.data_type.takes_precision() {
        match parts.as_slice() {
            [precision] => {
                parsed.precision = Some(precision.parse().ok()?);
                if matches!(
                    parsed.data_type,
                    DataType::Decimal | DataType::Numeric | DataType::Number
                ) {
                    parsed.scale = Some(0);
                }
            }
            [precision, scale] => {
                parsed.precision = Some(precision.parse().ok()?);
                parsed.scale = Some(scale.parse().ok()?);
            }
            _ => return None,
        }
    } else if !matches!(parsed.data_type, DataType::Enum | DataType::Set) {
        // Fractional-second precision and similar: must be numeric, value unused
        for part in parts {
            part.parse::<u32>().ok()?;
        }
    }

    Some(())
}

/// Normalize whitespace and drop MySQL column modifiers
///
/// `INT UNSIGNED ZEROFILL` reads as `INT`; a `CHARACTER SET` or `COLLATE`
/// clause ends the type name.
fn strip_modifiers(base: &str) -> String {
    let words: Vec<&str> = base.split_whitespace().collect();
    let mut kept = Vec::with_capacity(words.len());

    for (i, word) in words.iter().enumerate() {
        match *word {
            "UNSIGNED" | "SIGNED" | "ZEROFILL" => continue,
            "COLLATE" | "CHARSET" => break,
            "CHARACTER" | "CHAR" if words.get(i + 1) == Some(&"SET") => break,
            _ => kept.push(*word),
        }
    }

    kept.join(" ")
}

/// Map a normalized (upper-case, single-spaced) base type name
fn map_base_type(base: &str) -> Option<DataType> {
    let data_type = match base {
        // Integers
        "TINYINT" | "INT1" | "UINT8" => DataType::Tinyint,
        "SMALLINT" | "INT2" | "INT16" | "UINT16" | "SMALLSERIAL" => DataType::Smallint,
        "INT" | "INTEGER" | "INT4" | "INT32" | "UINT32" | "MEDIUMINT" | "SERIAL" => DataType::Int,
        "BIGINT" | "INT8" | "INT64" | "UINT64" | "BIGSERIAL" | "LONG" => DataType::Bigint,
        "NUMBER" => DataType::Number,

        // Floating point
        "FLOAT" | "FLOAT4" | "FLOAT32" | "REAL" => DataType::Float,
        "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT64" => DataType::Double,

        // Fixed point
        "DECIMAL" | "DEC" => DataType::Decimal,
        "NUMERIC" => DataType::Numeric,
        "MONEY" | "SMALLMONEY" => DataType::Money,

        "BOOLEAN" | "BOOL" => DataType::Boolean,

        // Character
        "CHAR" | "CHARACTER" | "NCHAR" | "BPCHAR" => DataType::Char,
        "VARCHAR" | "CHARACTER VARYING" | "NVARCHAR" | "VARCHAR2" | "NVARCHAR2" => {
            DataType::Varchar
        }
        "STRING" | "FIXEDSTRING" => DataType::String,
        "TEXT" | "NTEXT" | "TINYTEXT" | "LONGTEXT" | "CLOB" | "CITEXT" => DataType::Text,
        "MEDIUMTEXT" => DataType::Mediumtext,

        // Binary
        "BINARY" => DataType::Binary,
        "VARBINARY" | "BINARY VARYING" => DataType::Varbinary,
        "BYTEA" => DataType::Bytea,
        "BLOB" | "LONGBLOB" | "MEDIUMBLOB" | "TINYBLOB" | "BYTES" => DataType::Blob,

        // Temporal
        "DATE" | "DATE32" => DataType::Date,
        "DATETIME" | "DATETIME2" | "DATETIME64" | "SMALLDATETIME" => DataType::Datetime,
        "TIME" | "TIME WITHOUT TIME ZONE" | "TIMETZ" | "TIME WITH TIME ZONE" => DataType::Time,
        "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" | "TIMESTAMP_NTZ" => DataType::Timestamp,
        "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMP_TZ" | "TIMESTAMP_LTZ"
        | "DATETIMEOFFSET" => DataType::Timestampz,
        "INTERVAL" => DataType::Interval,
        "YEAR" => DataType::Year,

        // Semi-structured
        "JSON" | "JSONB" => DataType::Json,
        "VARIANT" | "OBJECT" | "SUPER" => DataType::Variant,
        "ARRAY" => DataType::Array,
        "MAP" => DataType::Map,
        "STRUCT" | "RECORD" | "ROW" | "TUPLE" => DataType::Struct,
        "ENUM" | "ENUM8" | "ENUM16" => DataType::Enum,
        "SET" => DataType::Set,
        "XML" => DataType::Xml,

        // Other
        "UUID" | "UNIQUEIDENTIFIER" => DataType::Uuid,
        "GEOGRAPHY" => DataType::Geography,
        "GEOMETRY" | "POINT" | "POLYGON" | "LINESTRING" => DataType::Geometry,
        "INET" | "IPV4" | "IPV6" => DataType::Inet,
        "CIDR" => DataType::Cidr,
        "BIT" | "VARBIT" | "BIT VARYING" => DataType::Bit,

        _ => return None,
    };

    Some(data_type)
}
