use super::write_atomically;
use crate::contract::FileWriter;
use crate::error::Result;
use crate::model::DataRecord;
use crate::options::JsonOptions;
use crate::validator::FileFormat;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes a single record as a JSON object and any other count as an array.
#[derive(Debug, Default, Clone)]
pub struct JsonWriter {
    options: JsonOptions,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: JsonOptions) -> Self {
        Self { options }
    }
}

impl FileWriter for JsonWriter {
    fn write(&self, records: &[DataRecord], path: &Path) -> Result<()> {
        let pretty = self.options.pretty;
        write_atomically(path, FileFormat::Json, |out| {
            match records {
                [single] => serialize(&mut *out, single, pretty)?,
                many => serialize(&mut *out, many, pretty)?,
            }
            out.write_all(b"\n")
        })?;
        info!(path = %path.display(), records = records.len(), "Wrote JSON file");
        Ok(())
    }
}

fn serialize<W, T>(out: W, value: &T, pretty: bool) -> std::io::Result<()>
where
    W: Write,
    T: serde::Serialize + ?Sized,
{
    let result = if pretty {
        serde_json::to_writer_pretty(out, value)
    } else {
        serde_json::to_writer(out, value)
    };
    result.map_err(std::io::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    fn record(value: Value) -> DataRecord {
        match value {
            Value::Object(fields) => DataRecord::from_fields(fields),
            _ => panic!("test records must be objects"),
        }
    }

    fn write_and_read(records: &[DataRecord], writer: JsonWriter) -> String {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        writer.write(records, &path).unwrap();
        fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn single_record_is_written_as_object() {
        let content = write_and_read(&[record(json!({"name": "John", "age": 30}))], JsonWriter::new());
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, json!({"name": "John", "age": 30}));
        assert!(content.contains('\n'), "pretty output spans lines");
    }

    #[test]
    fn several_records_are_written_as_array() {
        let records = vec![
            record(json!({"name": "John", "tags": ["a"]})),
            record(json!({"name": "Jane", "address": {"city": "Kyiv"}, "age": null})),
        ];
        let content = write_and_read(&records, JsonWriter::new());
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"name": "John", "tags": ["a"]},
                {"name": "Jane", "address": {"city": "Kyiv"}, "age": null}
            ])
        );
    }

    #[test]
    fn no_records_is_an_empty_array() {
        let content = write_and_read(&[], JsonWriter::new());
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn compact_output_when_pretty_disabled() {
        let writer = JsonWriter::with_options(JsonOptions { pretty: false });
        let content = write_and_read(&[record(json!({"a": 1, "b": 2}))], writer);
        assert_eq!(content, "{\"a\":1,\"b\":2}\n");
    }

    #[test]
    fn field_order_is_preserved() {
        let content = write_and_read(
            &[record(json!({"zeta": 1, "alpha": 2}))],
            JsonWriter::with_options(JsonOptions { pretty: false }),
        );
        assert!(content.find("zeta").unwrap() < content.find("alpha").unwrap());
    }
}
