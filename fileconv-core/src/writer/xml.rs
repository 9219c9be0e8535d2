use super::write_atomically;
use crate::contract::FileWriter;
use crate::error::Result;
use crate::model::{value_to_string, DataRecord, FieldValue};
use crate::options::XmlOptions;
use crate::validator::FileFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

/// Writes records as `<records><record>..</record></records>`.
///
/// Objects nest as child elements, arrays as repeated `<item>` children and
/// null as an empty element. Field names that are not valid XML names are
/// rewritten, see [`element_name`].
#[derive(Debug, Default, Clone)]
pub struct XmlWriter {
    options: XmlOptions,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: XmlOptions) -> Self {
        Self { options }
    }

    fn write_document<W: Write>(&self, out: W, records: &[DataRecord]) -> io::Result<()> {
        let mut xml = if self.options.indent > 0 {
            Writer::new_with_indent(out, b' ', self.options.indent)
        } else {
            Writer::new(out)
        };
        emit(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = element_name(&self.options.root_element);
        let record = element_name(&self.options.record_element);
        emit(&mut xml, Event::Start(BytesStart::new(&*root)))?;
        for data in records {
            emit(&mut xml, Event::Start(BytesStart::new(&*record)))?;
            for (key, value) in data.fields() {
                self.write_value(&mut xml, &element_name(key), value)?;
            }
            emit(&mut xml, Event::End(BytesEnd::new(&*record)))?;
        }
        emit(&mut xml, Event::End(BytesEnd::new(&*root)))?;
        xml.get_mut().write_all(b"\n")
    }

    fn write_value<W: Write>(
        &self,
        xml: &mut Writer<W>,
        name: &str,
        value: &FieldValue,
    ) -> io::Result<()> {
        match value {
            FieldValue::Null => emit(xml, Event::Empty(BytesStart::new(name))),
            FieldValue::Object(fields) => {
                emit(xml, Event::Start(BytesStart::new(name)))?;
                for (key, child) in fields {
                    self.write_value(xml, &element_name(key), child)?;
                }
                emit(xml, Event::End(BytesEnd::new(name)))
            }
            FieldValue::Array(items) => {
                let item = element_name(&self.options.item_element);
                emit(xml, Event::Start(BytesStart::new(name)))?;
                for entry in items {
                    self.write_value(xml, &item, entry)?;
                }
                emit(xml, Event::End(BytesEnd::new(name)))
            }
            scalar => {
                let text = value_to_string(scalar).unwrap_or_default();
                emit(xml, Event::Start(BytesStart::new(name)))?;
                emit(xml, Event::Text(BytesText::new(&text)))?;
                emit(xml, Event::End(BytesEnd::new(name)))
            }
        }
    }
}

impl FileWriter for XmlWriter {
    fn write(&self, records: &[DataRecord], path: &Path) -> Result<()> {
        write_atomically(path, FileFormat::Xml, |out| self.write_document(out, records))?;
        info!(path = %path.display(), records = records.len(), "Wrote XML file");
        Ok(())
    }
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> io::Result<()> {
    xml.write_event(event).map_err(io::Error::other)
}

/// Turns a field name into a valid XML element name.
///
/// Characters outside letters, digits, `_`, `-` and `.` become `_`. A name
/// that starts with anything other than a letter or `_` gets a `_` prefix, and
/// an empty name becomes `_`.
pub fn element_name(name: &str) -> Cow<'_, str> {
    static VALID: OnceLock<Regex> = OnceLock::new();
    static INVALID_CHAR: OnceLock<Regex> = OnceLock::new();

    let valid = VALID
        .get_or_init(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-]*$").expect("valid regex"));
    if valid.is_match(name) {
        return Cow::Borrowed(name);
    }

    let invalid_char = INVALID_CHAR
        .get_or_init(|| Regex::new(r"[^\p{L}\p{N}_.\-]").expect("valid regex"));
    let replaced = invalid_char.replace_all(name, "_");
    match replaced.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' => Cow::Owned(replaced.into_owned()),
        _ => Cow::Owned(format!("_{replaced}")),
    }
}
