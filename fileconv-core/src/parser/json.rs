use super::{absolute, open_input};
use crate::contract::FileParser;
use crate::error::{ConversionError, Result};
use crate::model::{DataRecord, FieldValue};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error, info};

/// Parses a JSON object (one record) or an array of objects (one record each).
#[derive(Debug, Default, Clone)]
pub struct JsonParser;

impl JsonParser {
    pub fn new() -> Self {
        Self
    }
}

impl FileParser for JsonParser {
    fn parse(&self, path: &Path) -> Result<Vec<DataRecord>> {
        let file = open_input(path)?;
        let root: FieldValue = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to parse JSON");
            ConversionError::Json {
                path: absolute(path),
                source: e,
            }
        })?;

        let records = match root {
            FieldValue::Array(elements) => elements.into_iter().map(into_record).collect(),
            FieldValue::Object(fields) => vec![DataRecord::from_fields(fields)],
            other => {
                return Err(ConversionError::Format(format!(
                    "Invalid JSON format: expected object or array, got {}",
                    node_type(&other)
                )))
            }
        };
        info!(path = %path.display(), records = records.len(), "Parsed JSON file");
        Ok(records)
    }
}

/// Array elements that are not objects become empty records.
fn into_record(value: FieldValue) -> DataRecord {
    match value {
        FieldValue::Object(fields) => DataRecord::from_fields(fields),
        other => {
            debug!(node = node_type(&other), "Non-object array element, using empty record");
            DataRecord::new()
        }
    }
}

fn node_type(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Null => "NULL",
        FieldValue::Bool(_) => "BOOLEAN",
        FieldValue::Number(_) => "NUMBER",
        FieldValue::String(_) => "STRING",
        FieldValue::Array(_) => "ARRAY",
        FieldValue::Object(_) => "OBJECT",
    }
}
