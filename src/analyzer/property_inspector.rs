//! Property inspector
//!
//! Reads the fixed set of reportable properties from a document. Inspection
//! never fails as a whole: a field that cannot be read becomes `Unknown`.

use std::path::Path;

use lopdf::{Dictionary, Object};
use tracing::{debug, instrument};

use crate::pdf_document::{bare_name, decode_text_string, PdfDocument};
use crate::types::{BookmarkState, Flag, InfoKey, PropertySnapshot, NONE, NOT_SET, UNKNOWN};

#[derive(Debug, Default, Clone)]
pub struct PropertyInspector;

impl PropertyInspector {
    pub fn new() -> Self {
        Self
    }

    /// Open `path` and inspect it; unreadable files yield an all-`Unknown`
    /// snapshot carrying the error.
    #[instrument(skip(self))]
    pub fn inspect_path(&self, path: &Path) -> PropertySnapshot {
        match PdfDocument::open(path) {
            Ok(document) => self.inspect(&document),
            Err(e) => {
                debug!("Cannot inspect {}: {}", path.display(), e);
                PropertySnapshot::unreadable(e.to_string())
            }
        }
    }

    pub fn inspect(&self, document: &PdfDocument) -> PropertySnapshot {
        let catalog = document.catalog().ok();
        let info = document.info_dict();

        PropertySnapshot {
            fast_web_view: Flag::from(document.linearized()),
            navigation_mode: catalog_name(catalog, b"PageMode"),
            page_layout: catalog_name(catalog, b"PageLayout"),
            tagged_pdf: catalog.map_or(Flag::Unknown, |c| Flag::from(c.has(b"MarkInfo") || c.has(b"StructTreeRoot"))),
            title: info_value(document, info, InfoKey::Title),
            author: info_value(document, info, InfoKey::Author),
            subject: info_value(document, info, InfoKey::Subject),
            keywords: info_value(document, info, InfoKey::Keywords),
            creator: info_value(document, info, InfoKey::Creator),
            producer: info_value(document, info, InfoKey::Producer),
            xmp_metadata: catalog.map_or(Flag::Unknown, |c| Flag::from(c.has(b"Metadata"))),
            child_bookmarks: bookmark_state(document),
            error: None,
        }
    }
}

fn catalog_name(catalog: Option<&Dictionary>, key: &[u8]) -> String {
    let catalog = match catalog {
        Some(catalog) => catalog,
        None => return UNKNOWN.to_string(),
    };
    match catalog.get(key) {
        Ok(value) => bare_name(value).unwrap_or_else(|| UNKNOWN.to_string()),
        Err(_) => NOT_SET.to_string(),
    }
}

fn info_value(document: &PdfDocument, info: Option<&Dictionary>, key: InfoKey) -> String {
    let value = match info.and_then(|info| info.get(key.as_str().as_bytes()).ok()) {
        Some(value) => value,
        None => return NONE.to_string(),
    };
    match document.resolve(value) {
        Some(Object::String(bytes, _)) => decode_text_string(bytes),
        Some(other) => bare_name(other).unwrap_or_else(|| UNKNOWN.to_string()),
        None => UNKNOWN.to_string(),
    }
}

/// Judge collapse state from the first top-level bookmark only
fn bookmark_state(document: &PdfDocument) -> BookmarkState {
    let root = match document.outline_root() {
        Some(root) => root,
        None => return BookmarkState::NoBookmarks,
    };
    let first = match root.get(b"First") {
        Ok(first) => first,
        Err(_) => return BookmarkState::NoBookmarks,
    };
    let first = match document.resolve_dict(first) {
        Some(first) => first,
        None => return BookmarkState::Unknown,
    };

    if !first.has(b"First") {
        return BookmarkState::NoChildren;
    }
    match first.get(b"Count").map(|count| document.resolve(count)) {
        Ok(Some(Object::Integer(count))) if *count < 0 => BookmarkState::Collapsed,
        Ok(Some(Object::Integer(_))) => BookmarkState::Expanded,
        Ok(_) => BookmarkState::Unknown,
        Err(_) => BookmarkState::NoChildren,
    }
}
