//! Writers for each supported output format.

pub mod csv;
pub mod json;
pub mod xml;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;
pub use self::xml::XmlWriter;

use crate::contract::FileWriter;
use crate::error::{ConversionError, Result};
use crate::options::ConvertOptions;
use crate::parser::absolute;
use crate::validator::FileFormat;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, error};

/// Builds the writer for `format`.
pub fn writer_for(format: FileFormat, options: &ConvertOptions) -> Box<dyn FileWriter> {
    match format {
        FileFormat::Json => Box::new(JsonWriter::with_options(options.json.clone())),
        FileFormat::Csv => Box::new(CsvWriter::with_options(options.csv.clone())),
        FileFormat::Xml => Box::new(XmlWriter::with_options(options.xml.clone())),
    }
}

/// Creates missing parent directories, then writes through a temporary file in
/// the destination directory that replaces `path` only once `body` succeeded.
pub(crate) fn write_atomically<F>(path: &Path, format: FileFormat, body: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if !parent.is_dir() {
        debug!(dir = %parent.display(), "Creating parent directory for output");
        fs::create_dir_all(parent).map_err(|e| {
            error!(dir = %parent.display(), error = ?e, "Failed to create parent directory");
            ConversionError::write(
                format!(
                    "Failed to create parent directory: {}",
                    absolute(parent).display()
                ),
                e,
            )
        })?;
    }

    let fail = |e: std::io::Error| {
        error!(path = %path.display(), %format, error = ?e, "Failed to write output file");
        ConversionError::write(
            format!(
                "Failed to write {format} file: {}",
                absolute(path).display()
            ),
            e,
        )
    };

    let mut tmp = temp_file_for(parent, path).map_err(fail)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        body(&mut out).map_err(fail)?;
        out.flush().map_err(fail)?;
    }
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

/// Creates the temporary file that will replace `destination`.
///
/// An existing destination keeps its permissions. A new one gets the same mode
/// a plain `File::create` would, i.e. `0o666` minus the umask on unix.
fn temp_file_for(dir: &Path, destination: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir)?;

    match fs::metadata(destination) {
        Ok(existing) if existing.is_file() => {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        _ => {}
    }
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.json");
        write_atomically(&path, FileFormat::Json, |w| w.write_all(b"[]")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn failed_body_leaves_existing_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "previous").unwrap();

        let err = write_atomically(&path, FileFormat::Csv, |w| {
            w.write_all(b"partial")?;
            Err(std::io::Error::other("boom"))
        })
        .unwrap_err();

        assert!(err.to_string().starts_with("Failed to write CSV file: "));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file must be cleaned up");
    }

    #[test]
    fn parent_that_is_a_file_is_reported() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_atomically(&blocker.join("out.json"), FileFormat::Json, |w| {
            w.write_all(b"[]")
        })
        .unwrap_err();

        assert!(
            err.to_string()
                .starts_with("Failed to create parent directory: "),
            "unexpected error: {err}"
        );
        assert!(err.to_string().ends_with("blocker"));
    }

    #[cfg(unix)]
    #[test]
    fn new_output_gets_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let reference = dir.path().join("reference.txt");
        fs::write(&reference, "x").unwrap();
        let path = dir.path().join("out.csv");

        write_atomically(&path, FileFormat::Csv, |w| w.write_all(b"a\n1\n")).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&reference));
    }

    #[cfg(unix)]
    #[test]
    fn overwritten_output_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomically(&path, FileFormat::Csv, |w| w.write_all(b"a\n1\n")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\n1\n");
        assert_eq!(
            fs::metadata(&path).unwrap().permissions().mode() & 0o777,
            0o640
        );
    }

    #[test]
    fn factory_picks_writer_per_format() {
        let dir = tempdir().unwrap();
        let options = ConvertOptions::default();
        for format in [FileFormat::Json, FileFormat::Xml, FileFormat::Csv] {
            let path = dir.path().join(format!("out.{}", format.extension()));
            writer_for(format, &options).write(&[], &path).unwrap();
            assert!(path.exists());
        }
    }
}
