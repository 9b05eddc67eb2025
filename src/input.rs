/// Record input: JSON parsing and the built-in sample rows.
///
/// Input is a JSON array of flat objects. Each element becomes one
/// `Record`; anything else is rejected with the offending index so the
/// caller can point at the bad row.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{json_type_name, GroupError};
use crate::model::Record;

/// Key path of the demonstration invocation.
pub const SAMPLE_FIELDS: [&str; 3] = ["steamid", "website", "id"];

/// Parses a JSON array of objects into records.
pub fn parse_records(json: &str) -> Result<Vec<Record>, GroupError> {
    let value: Value = serde_json::from_str(json)?;
    records_from_value(value)
}

/// Reads and parses a JSON records file.
pub fn load_records(path: &Path) -> Result<Vec<Record>, GroupError> {
    let contents = fs::read_to_string(path).map_err(|source| GroupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&contents)
}

fn records_from_value(value: Value) -> Result<Vec<Record>, GroupError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| Record::from_value(index, item))
            .collect(),
        other => Err(GroupError::NotAnArray {
            found: json_type_name(&other),
        }),
    }
}

/// The six demonstration records: `id` 0–5 with `steamid`/`website` pairs
/// (2,a) (2,b) (2,a) (1,b) (0,b) (2,b).
pub fn sample_rows() -> Vec<Record> {
    const ROWS: [(u64, &str, &str); 6] = [
        (0, "2", "a"),
        (1, "2", "b"),
        (2, "2", "a"),
        (3, "1", "b"),
        (4, "0", "b"),
        (5, "2", "b"),
    ];

    ROWS.iter()
        .map(|&(id, steamid, website)| {
            let mut fields = Map::new();
            fields.insert("id".to_string(), json!(id));
            fields.insert("steamid".to_string(), json!(steamid));
            fields.insert("website".to_string(), json!(website));
            Record::new(fields)
        })
        .collect()
}
