#![doc = "fileconv-core: core library for converting files between JSON, XML and CSV."]

//! Files are parsed into a list of [`DataRecord`]s (ordered maps of field name
//! to JSON-like value) and written back out in the target format.
//!
//! # Usage
//! ```no_run
//! use fileconv_core::SimpleFormatConverter;
//! use std::path::Path;
//!
//! let report = SimpleFormatConverter::new()
//!     .convert_sync(Path::new("people.csv"), Path::new("people.xml"))?;
//! println!("converted {} record(s)", report.records);
//! # Ok::<(), fileconv_core::ConversionError>(())
//! ```

pub mod contract;
pub mod converter;
pub mod error;
pub mod model;
pub mod options;
pub mod parser;
pub mod validator;
pub mod writer;

pub use contract::{ConversionReport, ConversionRequest, FileParser, FileWriter, FormatConverter};
pub use converter::{convert_with, SimpleFormatConverter};
pub use error::{ConversionError, Result};
pub use model::{DataField, DataRecord, FieldValue};
pub use options::{ConvertOptions, CsvOptions, JsonOptions, XmlOptions};
pub use validator::{detect_format, validate_file, FileFormat};
