//! Error type shared by every stage of a conversion.

use std::path::PathBuf;

/// Error type for detection, parsing, writing and converting files.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The caller supplied a bad path, an unsupported extension or an unusable file.
    #[error("{0}")]
    InvalidInput(String),

    /// Input file is missing at parse time.
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// Input file exists but cannot be opened for reading.
    #[error("File cannot be read: {}", .0.display())]
    Unreadable(PathBuf),

    #[error("Failed to parse JSON file: {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse XML file: {}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Failed to parse CSV file: {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The document parsed but its shape cannot be turned into records.
    #[error("{0}")]
    Format(String),

    /// Writing an output file failed.
    #[error("{message}")]
    Write {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Format detection failed while preparing a conversion.
    #[error("Format detection failed: {0}")]
    Detection(#[source] Box<ConversionError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ConversionError::InvalidInput(message.into())
    }

    pub fn write(message: impl Into<String>, source: std::io::Error) -> Self {
        ConversionError::Write {
            message: message.into(),
            source,
        }
    }

    /// True for errors caused by what the user asked for rather than by file contents.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            ConversionError::InvalidInput(_) => true,
            ConversionError::Detection(inner) => inner.is_invalid_input(),
            _ => false,
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_displays_message_verbatim() {
        let err = ConversionError::invalid_input("File path cannot be null or empty");
        assert_eq!(err.to_string(), "File path cannot be null or empty");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn detection_wraps_inner_message_and_keeps_source() {
        let inner = ConversionError::invalid_input("Unsupported file format: '.txt'");
        let err = ConversionError::Detection(Box::new(inner));
        assert_eq!(
            err.to_string(),
            "Format detection failed: Unsupported file format: '.txt'"
        );
        assert!(err.is_invalid_input());
        let source = std::error::Error::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), "Unsupported file format: '.txt'");
    }

    #[test]
    fn write_error_exposes_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConversionError::write("Failed to write CSV file: /tmp/out.csv", io);
        assert_eq!(err.to_string(), "Failed to write CSV file: /tmp/out.csv");
        assert!(!err.is_invalid_input());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_found_mentions_path() {
        let err = ConversionError::NotFound(PathBuf::from("/data/missing.json"));
        assert_eq!(err.to_string(), "File does not exist: /data/missing.json");
        assert!(!err.is_invalid_input());
    }
}
