//! # contract: seams between the converter and its format backends
//!
//! Parsers turn a file into [`DataRecord`]s, writers turn records back into a file,
//! and a [`FormatConverter`] wires one of each together for a request.
//!
//! All three traits are annotated for `mockall`, so tests (in this crate, or in
//! dependents through the `test-export-mocks` feature) can swap in
//! `MockFileParser`, `MockFileWriter` and `MockFormatConverter`.

use crate::error::Result;
use crate::model::DataRecord;
use crate::validator::FileFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Reads one file format into records.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait FileParser: Send + Sync {
    /// Parses the file at `path` into a list of records.
    fn parse(&self, path: &Path) -> Result<Vec<DataRecord>>;
}

/// Writes records in one file format.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait FileWriter: Send + Sync {
    /// Writes `records` to `path`, replacing any existing file.
    fn write(&self, records: &[DataRecord], path: &Path) -> Result<()>;
}

/// A single conversion to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_format: FileFormat,
    pub output_format: FileFormat,
    pub records: usize,
}

/// Converts a file from one format to another.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FormatConverter: Send + Sync {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionReport>;
}
