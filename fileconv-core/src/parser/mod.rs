//! Parsers for each supported input format.

pub mod csv;
pub mod json;
pub mod xml;

pub use self::csv::CsvParser;
pub use self::json::JsonParser;
pub use self::xml::XmlParser;

use crate::contract::FileParser;
use crate::error::{ConversionError, Result};
use crate::options::ConvertOptions;
use crate::validator::FileFormat;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::error;

/// Builds the parser for `format`.
pub fn parser_for(format: FileFormat, options: &ConvertOptions) -> Box<dyn FileParser> {
    match format {
        FileFormat::Json => Box::new(JsonParser::new()),
        FileFormat::Csv => Box::new(CsvParser::with_options(options.csv.clone())),
        FileFormat::Xml => Box::new(XmlParser::with_options(options.xml.clone())),
    }
}

/// Opens `path` for reading, mapping failures to the errors every parser reports.
pub(crate) fn open_input(path: &Path) -> Result<File> {
    if !path.exists() {
        error!(path = %path.display(), "Input file does not exist");
        return Err(ConversionError::NotFound(absolute(path)));
    }
    File::open(path).map_err(|e| {
        error!(path = %path.display(), error = ?e, "Input file cannot be opened");
        ConversionError::Unreadable(absolute(path))
    })
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_input_is_not_found() {
        let dir = tempdir().unwrap();
        let err = open_input(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConversionError::NotFound(_)));
        assert!(err.to_string().starts_with("File does not exist: "));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_input_is_reported_by_every_parser() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let options = ConvertOptions::default();
        for format in [FileFormat::Json, FileFormat::Xml, FileFormat::Csv] {
            let path = dir.path().join(format!("locked.{}", format.extension()));
            fs::write(&path, "a").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
            if File::open(&path).is_ok() {
                // Running with privileges that ignore file modes.
                return;
            }

            let err = parser_for(format, &options).parse(&path).unwrap_err();
            assert!(matches!(err, ConversionError::Unreadable(_)), "{format}: {err}");
            assert_eq!(
                err.to_string(),
                format!("File cannot be read: {}", absolute(&path).display())
            );
        }
    }
}
