use super::write_atomically;
use crate::contract::FileWriter;
use crate::error::Result;
use crate::model::{value_to_string, DataRecord};
use crate::options::CsvOptions;
use crate::validator::FileFormat;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Writes records as CSV with one column per distinct field name, sorted
/// alphabetically. Nested objects and arrays are stored as compact JSON.
#[derive(Debug, Default, Clone)]
pub struct CsvWriter {
    options: CsvOptions,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` omits the header row.
    pub fn with_headers(write_headers: bool) -> Self {
        Self::with_options(CsvOptions {
            write_headers,
            ..CsvOptions::default()
        })
    }

    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }
}

impl FileWriter for CsvWriter {
    fn write(&self, records: &[DataRecord], path: &Path) -> Result<()> {
        let headers = collect_field_names(records);
        if headers.is_empty() && !records.is_empty() {
            warn!(
                path = %path.display(),
                records = records.len(),
                "Records have no fields, writing one empty line per record"
            );
        }
        write_atomically(path, FileFormat::Csv, |out| {
            if headers.is_empty() {
                // One terminator per record, no header row to write.
                for _ in records {
                    out.write_all(b"\n")?;
                }
                return Ok(());
            }
            let mut csv_out = csv::WriterBuilder::new()
                .delimiter(self.options.delimiter)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(out);

            if self.options.write_headers {
                csv_out.write_record(&headers)?;
            }
            for record in records {
                let row = headers.iter().map(|header| {
                    record
                        .field(header)
                        .and_then(value_to_string)
                        .unwrap_or_default()
                });
                csv_out.write_record(row)?;
            }
            csv_out.flush()
        })?;
        info!(
            path = %path.display(),
            columns = headers.len(),
            records = records.len(),
            headers = self.options.write_headers,
            "Wrote CSV file"
        );
        Ok(())
    }
}

/// Union of all field names across `records`, in alphabetical order.
fn collect_field_names(records: &[DataRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.fields().keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
