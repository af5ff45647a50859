//! Resource and schema types (spec §3 DATA MODEL).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Float,
    Bool,
    Date,
    Datetime,
    Json,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Json => "json",
        }
    }

    /// Parses the `python_type` string csv-detective profiles carry
    /// upstream. Unrecognized values default to `String`, matching the
    /// "defaults to string" convention in the type-to-operator matrix.
    pub fn from_python_type(value: &str) -> ColumnType {
        match value {
            "int" => ColumnType::Int,
            "float" => ColumnType::Float,
            "bool" => ColumnType::Bool,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::Datetime,
            "json" => ColumnType::Json,
            _ => ColumnType::String,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ColumnType,
}

pub type Schema = Vec<Column>;

/// A single resource record as held by the upstream resource-index
/// table. `deleted_at` is the sole source of truth for readability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: String,
    pub created_at: DateTime<Utc>,
    pub url: Option<String>,
    pub parsing_table: String,
    #[serde(default)]
    pub profile: Schema,
    pub deleted_at: Option<DateTime<Utc>>,
    pub dataset_id: Option<String>,
}

impl Resource {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
