use super::{absolute, open_input};
use crate::contract::FileParser;
use crate::error::{ConversionError, Result};
use crate::model::{DataRecord, FieldValue};
use crate::options::CsvOptions;
use std::path::Path;
use tracing::{error, info};

/// Parses a CSV file whose first row names the columns.
///
/// Cells that are empty or missing from a short row become null; cells beyond
/// the header width are dropped. All other values stay strings.
#[derive(Debug, Default, Clone)]
pub struct CsvParser {
    options: CsvOptions,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }
}

impl FileParser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Vec<DataRecord>> {
        let file = open_input(path)?;
        let csv_error = |e: csv::Error| {
            error!(path = %path.display(), error = %e, "Failed to parse CSV");
            ConversionError::Csv {
                path: absolute(path),
                source: e,
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .from_reader(file);
        let mut rows = reader.records();

        let headers: Vec<String> = match rows.next() {
            Some(row) => row
                .map_err(csv_error)?
                .iter()
                .map(|h| h.trim().to_string())
                .collect(),
            None => {
                return Err(ConversionError::Format(format!(
                    "CSV file is empty: {}",
                    absolute(path).display()
                )))
            }
        };

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(csv_error)?;
            let mut record = DataRecord::new();
            for (i, header) in headers.iter().enumerate() {
                let value = match row.get(i) {
                    Some(cell) if !cell.is_empty() => FieldValue::String(cell.to_string()),
                    _ => FieldValue::Null,
                };
                record.add_field(header.clone(), value);
            }
            records.push(record);
        }

        info!(
            path = %path.display(),
            columns = headers.len(),
            records = records.len(),
            "Parsed CSV file"
        );
        Ok(records)
    }
}
