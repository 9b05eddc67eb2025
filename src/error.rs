/// Error types for record loading, grouping, and configuration.
///
/// Grouping itself only fails on malformed input: an element that is not a
/// JSON object, or a grouping field holding an array/object instead of a
/// scalar. A record that simply lacks a grouping field is NOT an error; it
/// lands in the `<missing>` bucket for that level.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning input into records or grouping them.
#[derive(Debug, Error)]
pub enum GroupError {
    /// Input element at `index` was not a JSON object.
    #[error("record {index} is not an object (found {found})")]
    InvalidRecord { index: usize, found: &'static str },

    /// Top-level input was not a JSON array of records.
    #[error("expected a JSON array of records, found {found}")]
    NotAnArray { found: &'static str },

    /// Grouping field held an array or object.
    #[error("field '{field}' must hold a scalar to group on (found {found})")]
    NonScalarField { field: String, found: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while loading `rowgroup.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Short JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
