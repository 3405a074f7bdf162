use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Column type a field coerces to before insertion.
///
/// Mirrors the analytical store's type system; `ARRAY<T>` nests one level of
/// any scalar type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Int64,
    Float64,
    Bool,
    Timestamp,
    Date,
    /// Arbitrary payload fragment stored as canonical JSON text.
    Json,
    Array(Box<TargetType>),
}

impl TargetType {
    /// Parse a declared type string from a schema config, e.g. `"INT64"` or
    /// `"ARRAY<STRING>"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix("ARRAY<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let element = TargetType::parse(inner)?;
            if matches!(element, TargetType::Array(_)) {
                return Err(format!("nested array type is not supported: {s}"));
            }
            return Ok(TargetType::Array(Box::new(element)));
        }
        match trimmed.to_uppercase().as_str() {
            "STRING" => Ok(TargetType::String),
            "INT64" => Ok(TargetType::Int64),
            "FLOAT64" => Ok(TargetType::Float64),
            "BOOL" => Ok(TargetType::Bool),
            "TIMESTAMP" => Ok(TargetType::Timestamp),
            "DATE" => Ok(TargetType::Date),
            "JSON" => Ok(TargetType::Json),
            _ => Err(format!("unknown target type: {s}")),
        }
    }

    /// Element type for `ARRAY<T>` declarations.
    pub fn element_type(&self) -> Option<&TargetType> {
        match self {
            TargetType::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TargetType::Array(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::String => write!(f, "STRING"),
            TargetType::Int64 => write!(f, "INT64"),
            TargetType::Float64 => write!(f, "FLOAT64"),
            TargetType::Bool => write!(f, "BOOL"),
            TargetType::Timestamp => write!(f, "TIMESTAMP"),
            TargetType::Date => write!(f, "DATE"),
            TargetType::Json => write!(f, "JSON"),
            TargetType::Array(element) => write!(f, "ARRAY<{element}>"),
        }
    }
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetType::parse(s)
    }
}

impl Serialize for TargetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TargetType::parse(&raw).map_err(D::Error::custom)
    }
}

/// Column mode for a declared field, derived from its declaration rather than
/// stored in config: `ARRAY<T>` fields are repeated, `required: true` fields
/// are required, everything else is nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Required,
    Nullable,
    Repeated,
}

impl FieldMode {
    pub fn derive(target_type: &TargetType, required: bool) -> Self {
        if target_type.is_array() {
            FieldMode::Repeated
        } else if required {
            FieldMode::Required
        } else {
            FieldMode::Nullable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMode::Required => "REQUIRED",
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Repeated => "REPEATED",
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
