//! File format detection and input file validation.

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, error};

const SUPPORTED: &str = "Supported formats: .json, .xml, .csv";

/// Formats the converter can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Xml,
    Csv,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Xml => "xml",
            FileFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Json => "JSON",
            FileFormat::Xml => "XML",
            FileFormat::Csv => "CSV",
        };
        f.write_str(name)
    }
}

/// Detects the format of `file_path` from its extension (case-insensitive).
pub fn detect_format(file_path: &str) -> Result<FileFormat> {
    let trimmed = file_path.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::invalid_input(
            "File path cannot be null or empty",
        ));
    }

    let file_name = Path::new(trimmed)
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let extension = match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => &file_name[idx..],
        _ => {
            return Err(ConversionError::invalid_input(format!(
                "File '{file_path}' has no extension. {SUPPORTED}"
            )))
        }
    };

    let format = match extension {
        ".json" => FileFormat::Json,
        ".xml" => FileFormat::Xml,
        ".csv" => FileFormat::Csv,
        other => {
            return Err(ConversionError::invalid_input(format!(
                "Unsupported file format: '{other}'. {SUPPORTED}"
            )))
        }
    };
    debug!(path = file_path, %format, "Detected file format");
    Ok(format)
}

/// Checks that `file_path` names an existing, readable, non-empty file with a
/// supported extension and returns its format.
pub fn validate_file(file_path: &str) -> Result<FileFormat> {
    let trimmed = file_path.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::invalid_input(
            "File path cannot be null or empty",
        ));
    }

    let path = Path::new(trimmed);
    let fail = |message: String| {
        error!(path = file_path, %message, "Input file validation failed");
        Err(ConversionError::InvalidInput(message))
    };

    if !path.exists() {
        return fail(format!("File does not exist: '{file_path}'"));
    }
    if !path.is_file() {
        return fail(format!("Path is not a file: '{file_path}'"));
    }
    let metadata = match std::fs::File::open(path).and_then(|f| f.metadata()) {
        Ok(metadata) => metadata,
        Err(_) => {
            return fail(format!(
                "File is not readable: '{file_path}'. Check file permissions."
            ))
        }
    };
    if metadata.len() == 0 {
        return fail(format!("File is empty: '{file_path}'"));
    }

    detect_format(file_path)
}
