//! Loading, inspecting and serializing PDF documents.
//!
//! Splitter and Compressor share the single parse routine in [`load`], so a
//! corrupt input surfaces as the same [`DocError::Parse`] from either side.

use std::io::Read;

use lopdf::{Dictionary, Document, Object, SaveOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DocError;

/// Descriptive metadata keys cleared by the compressor
pub const METADATA_KEYS: [&str; 6] = [
    "Title", "Author", "Subject", "Keywords", "Producer", "Creator",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Ignore encryption markers instead of rejecting the document
    pub permissive: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { permissive: true }
    }
}

/// How a document is written back to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Classic cross-reference table, one top-level object per entry
    Classic,
    /// Object streams plus a cross-reference stream
    ObjectStreams,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Buffer a document from any reader. This is the only source of `Read` errors.
pub fn read_from<R: Read>(mut reader: R) -> Result<Vec<u8>, DocError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DocError::Read { source })?;
    debug!(size = bytes.len(), "document buffered");
    Ok(bytes)
}

/// Parse PDF bytes into a document
pub fn load(bytes: &[u8], options: &ParseOptions) -> Result<Document, DocError> {
    parse(bytes, options).map(|(doc, _)| doc)
}

/// Parse PDF bytes, also reporting whether the file carried an encryption dictionary.
///
/// lopdf decrypts readable files while loading but leaves `/Encrypt` in the
/// trailer, and never re-encrypts on save. In permissive mode the marker is
/// dropped so the written output is plain; a file lopdf could not decrypt is
/// unreadable and rejected either way.
fn parse(bytes: &[u8], options: &ParseOptions) -> Result<(Document, bool), DocError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(DocError::parse(bytes.len(), "missing %PDF- header"));
    }

    let mut doc = Document::load_mem(bytes).map_err(|e| DocError::parse(bytes.len(), e))?;

    let encrypted = doc.is_encrypted();
    if encrypted {
        if !options.permissive {
            return Err(DocError::parse(bytes.len(), "document is encrypted"));
        }
        if doc.encryption_state.is_none() {
            return Err(DocError::parse(
                bytes.len(),
                "document is encrypted and could not be decrypted",
            ));
        }
        strip_encryption(&mut doc);
        warn!(
            size = bytes.len(),
            "dropped encryption dictionary in permissive mode"
        );
    }

    debug!(size = bytes.len(), version = %doc.version, "document parsed");
    Ok((doc, encrypted))
}

fn strip_encryption(doc: &mut Document) {
    let dict_id = doc
        .trailer
        .get(b"Encrypt")
        .ok()
        .and_then(|obj| obj.as_reference().ok());
    if let Some(id) = dict_id {
        doc.objects.remove(&id);
    }
    doc.trailer.remove(b"Encrypt");
    doc.encryption_state = None;
}

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, DocError> {
    let doc = load(bytes, &ParseOptions::default())?;
    Ok(doc.get_pages().len() as u32)
}

/// Parse a document and report its basic properties
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, DocError> {
    let (doc, encrypted) = parse(bytes, &ParseOptions::default())?;
    let info = info_dict(&doc);
    let text = |key: &[u8]| {
        info.and_then(|dict| dict.get(key).ok())
            .and_then(|obj| obj.as_str().ok())
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .filter(|s| !s.is_empty())
    };

    Ok(DocumentInfo {
        page_count: doc.get_pages().len() as u32,
        version: doc.version.clone(),
        encrypted,
        size_bytes: bytes.len(),
        title: text(b"Title"),
        author: text(b"Author"),
    })
}

/// Write a document to bytes
pub fn serialize(doc: &mut Document, mode: SaveMode) -> Result<Vec<u8>, lopdf::Error> {
    let mut buffer = Vec::new();
    match mode {
        SaveMode::Classic => {
            doc.save_to(&mut buffer)?;
        }
        SaveMode::ObjectStreams => {
            let options = SaveOptions::builder()
                .use_object_streams(true)
                .use_xref_streams(true)
                .build();
            doc.save_with_options(&mut buffer, options)?;
        }
    }
    Ok(buffer)
}

/// Blank every descriptive metadata field, creating the Info dictionary if absent.
/// Page objects are never touched.
pub fn clear_metadata(doc: &mut Document) {
    let info_ref = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    let dict = match info_ref {
        Some(id) => doc
            .objects
            .get_mut(&id)
            .and_then(|obj| obj.as_dict_mut().ok()),
        None => doc
            .trailer
            .get_mut(b"Info")
            .ok()
            .and_then(|obj| obj.as_dict_mut().ok()),
    };

    match dict {
        Some(dict) => blank_fields(dict),
        None => {
            let mut dict = Dictionary::new();
            blank_fields(&mut dict);
            let id = doc.add_object(dict);
            doc.trailer.set("Info", Object::Reference(id));
        }
    }
}

fn blank_fields(dict: &mut Dictionary) {
    for key in METADATA_KEYS {
        dict.set(key, Object::string_literal(""));
    }
}

fn info_dict(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    match info {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}
