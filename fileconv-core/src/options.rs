//! Tunables for parsers and writers.
//!
//! Every section defaults to the behaviour of a plain `fileconv --input .. --output ..`
//! run, so a config file only needs to name the settings it changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub csv: CsvOptions,
    pub json: JsonOptions,
    pub xml: XmlOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Emit a header row when writing. Parsing always expects one.
    pub write_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            write_headers: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlOptions {
    pub root_element: String,
    pub record_element: String,
    /// Element name used for array entries.
    pub item_element: String,
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            root_element: "records".to_string(),
            record_element: "record".to_string(),
            item_element: "item".to_string(),
            indent: 2,
        }
    }
}
