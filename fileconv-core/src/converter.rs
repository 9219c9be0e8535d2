//! # converter: detect, parse, write
//!
//! [`SimpleFormatConverter`] picks a parser from the input extension and a
//! writer from the output extension, then moves every record across. The
//! blocking work runs on tokio's blocking pool when driven through
//! [`FormatConverter`].

use crate::contract::{ConversionReport, ConversionRequest, FileParser, FileWriter, FormatConverter};
use crate::error::{ConversionError, Result};
use crate::options::ConvertOptions;
use crate::parser::parser_for;
use crate::validator::{detect_format, FileFormat};
use crate::writer::writer_for;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default)]
pub struct SimpleFormatConverter {
    options: ConvertOptions,
}

impl SimpleFormatConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Converts `input` into `output`, blocking the current thread.
    pub fn convert_sync(&self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let input_format = detect(input)?;
        let output_format = detect(output)?;
        debug!(%input_format, %output_format, "Selected conversion");

        let parser = parser_for(input_format, &self.options);
        let writer = writer_for(output_format, &self.options);
        let records = convert_with(parser.as_ref(), writer.as_ref(), input, output)?;

        Ok(ConversionReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_format,
            output_format,
            records,
        })
    }
}

#[async_trait]
impl FormatConverter for SimpleFormatConverter {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionReport> {
        let converter = self.clone();
        tokio::task::spawn_blocking(move || converter.convert_sync(&request.input, &request.output))
            .await
            .map_err(|e| {
                error!(error = %e, "Conversion task did not complete");
                ConversionError::Io(std::io::Error::other(e))
            })?
    }
}

/// Parses `input` with `parser` and writes the records to `output` with
/// `writer`. Returns the number of records moved.
pub fn convert_with(
    parser: &dyn FileParser,
    writer: &dyn FileWriter,
    input: &Path,
    output: &Path,
) -> Result<usize> {
    let records = parser.parse(input).inspect_err(|e| {
        error!(input = %input.display(), error = %e, "Parsing input failed");
    })?;
    writer.write(&records, output).inspect_err(|e| {
        error!(output = %output.display(), error = %e, "Writing output failed");
    })?;
    info!(
        input = %input.display(),
        output = %output.display(),
        records = records.len(),
        "Conversion finished"
    );
    Ok(records.len())
}

fn detect(path: &Path) -> Result<FileFormat> {
    detect_format(&path.to_string_lossy()).map_err(|e| {
        error!(path = %path.display(), error = %e, "Format detection failed");
        ConversionError::Detection(Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MockFileParser, MockFileWriter};
    use crate::model::DataRecord;
    use mockall::predicate::eq;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_records() -> Vec<DataRecord> {
        let mut first = DataRecord::new();
        first.add_field("name", json!("John"));
        let mut second = DataRecord::new();
        second.add_field("name", json!("Jane"));
        vec![first, second]
    }

    #[test]
    fn pipeline_hands_parsed_records_to_writer() {
        let input = PathBuf::from("in.json");
        let output = PathBuf::from("out.xml");

        let mut parser = MockFileParser::new();
        parser
            .expect_parse()
            .with(eq(input.clone()))
            .times(1)
            .returning(|_| Ok(sample_records()));

        let mut writer = MockFileWriter::new();
        writer
            .expect_write()
            .withf(|records, path| records == sample_records().as_slice() && path == Path::new("out.xml"))
            .times(1)
            .returning(|_, _| Ok(()));

        let count = convert_with(&parser, &writer, &input, &output).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn parse_failure_skips_writer() {
        let mut parser = MockFileParser::new();
        parser
            .expect_parse()
            .returning(|_| Err(ConversionError::Format("bad input".into())));
        let mut writer = MockFileWriter::new();
        writer.expect_write().never();

        let err = convert_with(&parser, &writer, Path::new("a.csv"), Path::new("b.json"))
            .unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn write_failure_is_propagated() {
        let mut parser = MockFileParser::new();
        parser.expect_parse().returning(|_| Ok(sample_records()));
        let mut writer = MockFileWriter::new();
        writer.expect_write().returning(|_, _| {
            Err(ConversionError::write(
                "Failed to write CSV file: b.csv",
                std::io::Error::other("disk full"),
            ))
        });

        let err = convert_with(&parser, &writer, Path::new("a.json"), Path::new("b.csv"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to write CSV file: b.csv");
    }

    #[test]
    fn unsupported_output_extension_is_a_detection_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"{"name": "John"}"#).unwrap();

        let err = SimpleFormatConverter::new()
            .convert_sync(&input, &dir.path().join("out.txt"))
            .unwrap_err();
        assert!(matches!(err, ConversionError::Detection(_)));
        assert!(err.is_invalid_input());
        assert!(err
            .to_string()
            .starts_with("Format detection failed: Unsupported file format: '.txt'"));
    }

    #[test]
    fn directory_as_output_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"{"name": "John"}"#).unwrap();
        let output = dir.path().join("output_dir");
        fs::create_dir(&output).unwrap();

        assert!(SimpleFormatConverter::new()
            .convert_sync(&input, &output)
            .is_err());
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempdir().unwrap();
        let err = SimpleFormatConverter::new()
            .convert_sync(&dir.path().join("nonexistent.json"), &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(matches!(err, ConversionError::NotFound(_)));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[tokio::test]
    async fn async_convert_reports_formats_and_count() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("people.csv");
        fs::write(&input, "name,age\nJohn,30\nJane,25\n").unwrap();
        let output = dir.path().join("people.json");

        let report = SimpleFormatConverter::new()
            .convert(ConversionRequest::new(&input, &output))
            .await
            .unwrap();

        assert_eq!(report.input_format, FileFormat::Csv);
        assert_eq!(report.output_format, FileFormat::Json);
        assert_eq!(report.records, 2);
        assert_eq!(report.output, output);
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written,
            json!([{"age": "30", "name": "John"}, {"age": "25", "name": "Jane"}])
        );
    }

    #[test]
    fn options_reach_the_writer() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        fs::write(&input, r#"[{"b": 1, "a": 2}]"#).unwrap();
        let output = dir.path().join("out.csv");

        let mut options = ConvertOptions::default();
        options.csv.write_headers = false;
        SimpleFormatConverter::with_options(options)
            .convert_sync(&input, &output)
            .unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "2,1\n");
    }
}
