//! XML input.
//!
//! The document is first read into a [`FieldValue`] tree, then records are
//! pulled out of it. Expected layout (element names are configurable):
//!
//! ```xml
//! <records>
//!   <record>
//!     <name>John Doe</name>
//!     <address><city>New York</city></address>
//!     <tags><item>rust</item><item>xml</item></tags>
//!     <age/>
//!   </record>
//! </records>
//! ```
//!
//! Tree rules:
//! - the root element's own name is dropped, its content is the tree root;
//! - elements with children become objects, repeated names merge into arrays;
//! - attributes become fields next to child elements;
//! - text-only elements become strings, empty elements become null;
//! - `<x><item>..</item><item>..</item></x>` becomes an array under `x`;
//! - strings are typed afterwards: `null`/blank to null, numerics to numbers.

use super::{absolute, open_input};
use crate::contract::FileParser;
use crate::error::{ConversionError, Result};
use crate::model::{DataRecord, FieldMap, FieldValue};
use crate::options::XmlOptions;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error, info};

/// Key under which text is stored when an element mixes text and children.
pub const MIXED_TEXT_KEY: &str = "";

#[derive(Debug, Default, Clone)]
pub struct XmlParser {
    options: XmlOptions,
}

impl XmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: XmlOptions) -> Self {
        Self { options }
    }
}

impl FileParser for XmlParser {
    fn parse(&self, path: &Path) -> Result<Vec<DataRecord>> {
        let file = open_input(path)?;
        let (root_name, tree) = read_tree(BufReader::new(file), path)?;
        debug!(path = %path.display(), root = %root_name, "Read XML tree");

        let tree = type_scalars(unwrap_item_wrappers(tree, &self.options.item_element));
        let records = match tree {
            FieldValue::Null => Vec::new(),
            FieldValue::Object(map) => extract_records(FieldValue::Object(map), &self.options),
            scalar => {
                let mut record = DataRecord::new();
                record.add_field(root_name, scalar);
                vec![record]
            }
        };

        info!(path = %path.display(), records = records.len(), "Parsed XML file");
        Ok(records)
    }
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    children: FieldMap,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> std::result::Result<Self, quick_xml::Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = FieldMap::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            children.insert(key, FieldValue::String(value));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(mut self) -> (String, FieldValue) {
        let has_text = !self.text.trim().is_empty();
        let value = if self.children.is_empty() {
            if has_text {
                FieldValue::String(self.text)
            } else {
                FieldValue::Null
            }
        } else {
            // Between child elements only the text itself counts, not the indentation.
            if has_text {
                let text = self.text.trim().to_string();
                self.children
                    .insert(MIXED_TEXT_KEY.to_string(), FieldValue::String(text));
            }
            FieldValue::Object(self.children)
        };
        (self.name, value)
    }

    /// Adds a closed child; a repeated name turns the field into an array.
    fn attach(&mut self, name: String, value: FieldValue) {
        match self.children.get_mut(&name) {
            // Closed elements are never arrays, so an array here came from merging.
            Some(FieldValue::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = FieldValue::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

/// Reads the whole document and returns the root element name and its content.
fn read_tree<R: std::io::BufRead>(input: R, path: &Path) -> Result<(String, FieldValue)> {
    let xml_error = |e: quick_xml::Error| {
        error!(path = %path.display(), error = %e, "Failed to parse XML");
        ConversionError::Xml {
            path: absolute(path),
            source: e,
        }
    };
    let structure_error = |reason: &str| {
        error!(path = %path.display(), reason, "Malformed XML document");
        ConversionError::Format(format!(
            "Failed to parse XML file: {}: {reason}",
            absolute(path).display()
        ))
    };

    // Leaf text is kept verbatim, so whitespace is not trimmed by the reader.
    let mut reader = Reader::from_reader(input);

    let mut buf = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, FieldValue)> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error)?;
        let closed = match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(structure_error("multiple root elements"));
                }
                stack.push(Frame::open(&start).map_err(xml_error)?);
                None
            }
            Event::Empty(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(structure_error("multiple root elements"));
                }
                Some(Frame::open(&start).map_err(xml_error)?.close())
            }
            Event::End(_) => match stack.pop() {
                Some(frame) => Some(frame.close()),
                None => return Err(structure_error("unexpected closing tag")),
            },
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => debug!("Ignoring text outside the root element"),
                }
                None
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some((name, value)) = closed {
            match stack.last_mut() {
                Some(parent) => parent.attach(name, value),
                None => root = Some((name, value)),
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(structure_error("unexpected end of document"));
    }
    root.ok_or_else(|| structure_error("no root element"))
}

/// Replaces `{"item": [..]}` wrapper objects with the array they wrap.
fn unwrap_item_wrappers(value: FieldValue, item: &str) -> FieldValue {
    match value {
        FieldValue::Object(map) => FieldValue::Object(
            map.into_iter()
                .map(|(key, value)| (key, unwrap_wrapper(value, item)))
                .collect(),
        ),
        FieldValue::Array(items) => FieldValue::Array(
            items
                .into_iter()
                .map(|value| unwrap_wrapper(value, item))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn unwrap_wrapper(value: FieldValue, item: &str) -> FieldValue {
    match value {
        FieldValue::Object(mut map)
            if map.len() == 1 && map.get(item).is_some_and(FieldValue::is_array) =>
        {
            let items = map.remove(item).unwrap_or_default();
            unwrap_item_wrappers(items, item)
        }
        other => unwrap_item_wrappers(other, item),
    }
}

fn type_scalars(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::String(text) => infer_scalar(text),
        FieldValue::Object(map) => FieldValue::Object(
            map.into_iter()
                .map(|(key, value)| (key, type_scalars(value)))
                .collect(),
        ),
        FieldValue::Array(items) => {
            FieldValue::Array(items.into_iter().map(type_scalars).collect())
        }
        other => other,
    }
}

/// Types XML text: blank or `null` to null, `1.5` to a float, `30` to an integer.
pub fn infer_scalar(text: String) -> FieldValue {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return FieldValue::Null;
    }
    if text.contains('.') {
        if let Some(number) = text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
        {
            return FieldValue::Number(number);
        }
    } else if let Ok(int) = text.parse::<i64>() {
        return FieldValue::Number(int.into());
    }
    FieldValue::String(text)
}

/// Finds the records inside the tree root.
///
/// A `records` field is descended into; a `record` field yields one record per
/// object; otherwise the root object itself is the only record.
fn extract_records(tree: FieldValue, options: &XmlOptions) -> Vec<DataRecord> {
    let mut map = match tree {
        FieldValue::Object(map) => map,
        FieldValue::Array(items) => return records_from_array(items),
        _ => return Vec::new(),
    };

    if let Some(inner) = map.remove(&options.root_element) {
        return extract_records(inner, options);
    }
    match map.remove(&options.record_element) {
        Some(FieldValue::Object(fields)) => vec![DataRecord::from_fields(fields)],
        Some(FieldValue::Array(items)) => records_from_array(items),
        Some(_) => Vec::new(),
        None => vec![DataRecord::from_fields(map)],
    }
}

fn records_from_array(items: Vec<FieldValue>) -> Vec<DataRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            FieldValue::Object(fields) => Some(DataRecord::from_fields(fields)),
            other => {
                debug!(value = %other, "Skipping non-object record entry");
                None
            }
        })
        .collect()
}
