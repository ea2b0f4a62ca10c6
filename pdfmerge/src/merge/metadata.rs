//! PDF metadata management.
//!
//! This module writes the merged document's Info dictionary:
//! - Title, Author, Subject, Keywords (when given)
//! - Creator, Producer
//! - Creation and modification dates

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::config::Metadata;
use crate::error::MergeError;

/// Name recorded as Creator and Producer.
const PRODUCER: &str = "pdfmerge";

/// Manager for PDF metadata.
#[derive(Debug, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write the Info dictionary of `doc`.
    ///
    /// Producer, Creator and both dates are always set; the descriptive
    /// fields only when present in `metadata`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing Info entry is not a dictionary.
    pub fn set_metadata(&self, doc: &mut Document, metadata: &Metadata) -> Result<(), MergeError> {
        self.set_metadata_at(doc, metadata, Utc::now())
    }

    fn set_metadata_at(
        &self,
        doc: &mut Document,
        metadata: &Metadata,
        now: DateTime<Utc>,
    ) -> Result<(), MergeError> {
        let info_id = match doc.trailer.get(b"Info").and_then(|i| i.as_reference()) {
            Ok(id) => id,
            Err(_) => {
                let id = doc.add_object(Dictionary::new());
                doc.trailer.set("Info", Object::Reference(id));
                id
            }
        };

        let info = doc
            .get_object_mut(info_id)
            .and_then(|obj| obj.as_dict_mut())
            .map_err(|e| MergeError::assemble(format!("Info dictionary unavailable: {e}")))?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let date = format_pdf_date(now);
        info.set("CreationDate", Object::string_literal(date.clone()));
        info.set("ModDate", Object::string_literal(date));

        Ok(())
    }

    /// Read the descriptive fields back from `doc`.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = doc
            .trailer
            .get(b"Info")
            .and_then(|i| i.as_reference())
            .and_then(|id| doc.get_dictionary(id))
            .ok()
        else {
            return Metadata::default();
        };

        Metadata::new(
            read_text(info, b"Title"),
            read_text(info, b"Author"),
            read_text(info, b"Subject"),
            read_text(info, b"Keywords"),
        )
    }
}

/// Encode a text string: PDFDocEncoding-compatible ASCII stays literal,
/// anything else becomes UTF-16BE with a byte order mark.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn read_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Ok(Object::String(bytes, _)) = dict.get(key) else {
        return None;
    };

    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.clone()).ok(),
    }
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}
