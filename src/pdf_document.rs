//! PDF Document abstraction over `lopdf`
//!
//! Gives the rest of the crate typed access to the catalog, the trailer, the
//! outline root and the metadata containers, plus the `save(path, linearize)`
//! operation the save protocol is built on.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, instrument};

use crate::error::{Error, Result, StructureError};
use crate::structure::linearization::{detect_linearized, LinearizeOutcome, Linearizer};

/// Upper bound on reference chains followed by [`PdfDocument::resolve`]
const MAX_REFERENCE_HOPS: usize = 32;

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Unreachable objects dropped before writing
    pub pruned_objects: usize,
    /// `None` when linearization was not requested
    pub linearization: Option<LinearizeOutcome>,
}

/// One opened PDF, exclusively owned by the pipeline processing it
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: lopdf::Document,
    source: Option<PathBuf>,
    linearized: Option<bool>,
}

impl PdfDocument {
    /// Open a PDF from disk.
    ///
    /// The whole file is read into memory before parsing, so no handle on
    /// `path` stays open and the same path may be used as a save target.
    #[instrument]
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| Error::parse(path, e))?;
        let mut document = Self::parse(&data).map_err(|reason| Error::parse(path, reason))?;
        document.source = Some(path.to_path_buf());
        debug!("Opened {} ({} objects)", path.display(), document.inner.objects.len());
        Ok(document)
    }

    /// Parse a PDF held in memory
    pub fn load_mem(data: &[u8]) -> Result<Self> {
        Self::parse(data).map_err(|reason| Error::parse("<memory>", reason))
    }

    /// Wrap an already-built `lopdf` document. The linearization flag is unknown.
    pub fn from_document(inner: lopdf::Document) -> Self {
        Self {
            inner,
            source: None,
            linearized: None,
        }
    }

    fn parse(data: &[u8]) -> std::result::Result<Self, String> {
        let inner = lopdf::Document::load_mem(data).map_err(|e| e.to_string())?;
        if inner.trailer.has(b"Encrypt") {
            return Err("encrypted documents are not supported".to_string());
        }
        Ok(Self {
            inner,
            source: None,
            linearized: detect_linearized(data),
        })
    }

    pub fn document(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn document_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Linearization flag as detected from the bytes this document was parsed from
    pub fn linearized(&self) -> Option<bool> {
        self.linearized
    }

    pub fn trailer(&self) -> &Dictionary {
        &self.inner.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Dictionary {
        &mut self.inner.trailer
    }

    pub fn catalog_id(&self) -> Result<ObjectId> {
        let root = self
            .inner
            .trailer
            .get(b"Root")
            .map_err(|_| StructureError::MissingRoot)?;
        root.as_reference()
            .map_err(|_| StructureError::InvalidCatalog("Root is not an indirect reference".into()).into())
    }

    pub fn catalog(&self) -> Result<&Dictionary> {
        let id = self.catalog_id()?;
        self.inner
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| StructureError::InvalidCatalog(e.to_string()).into())
    }

    pub fn catalog_mut(&mut self) -> Result<&mut Dictionary> {
        let id = self.catalog_id()?;
        self.inner
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| StructureError::InvalidCatalog(e.to_string()).into())
    }

    /// Follow indirect references until a direct object is reached
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        for _ in 0..MAX_REFERENCE_HOPS {
            match current {
                Object::Reference(id) => current = self.inner.get_object(*id).ok()?,
                direct => return Some(direct),
            }
        }
        None
    }

    pub fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(object).and_then(|o| o.as_dict().ok())
    }

    /// Object id of the outline root, if the catalog points at a dictionary
    pub fn outline_root_id(&self) -> Option<ObjectId> {
        let id = self.catalog().ok()?.get(b"Outlines").ok()?.as_reference().ok()?;
        self.inner.get_object(id).ok()?.as_dict().ok()?;
        Some(id)
    }

    /// Like [`outline_root_id`](Self::outline_root_id), but a direct `Outlines`
    /// dictionary is first moved into the object table so its bookmarks can be edited.
    pub fn editable_outline_root(&mut self) -> Option<ObjectId> {
        if let Some(id) = self.outline_root_id() {
            return Some(id);
        }
        let inline = match self.catalog().ok()?.get(b"Outlines").ok()? {
            Object::Dictionary(dict) => dict.clone(),
            _ => return None,
        };
        let id = self.inner.add_object(inline);
        self.catalog_mut().ok()?.set("Outlines", id);
        debug!("Moved direct outline root to {} {} R", id.0, id.1);
        Some(id)
    }

    pub fn outline_root(&self) -> Option<&Dictionary> {
        let outlines = self.catalog().ok()?.get(b"Outlines").ok()?;
        self.resolve_dict(outlines)
    }

    /// True when the outline root exists and has at least one top-level bookmark
    pub fn has_bookmarks(&self) -> bool {
        self.outline_root().map_or(false, |root| root.has(b"First"))
    }

    /// Legacy Info dictionary referenced from the trailer
    pub fn info_dict(&self) -> Option<&Dictionary> {
        let info = self.inner.trailer.get(b"Info").ok()?;
        self.resolve_dict(info)
    }

    /// Save to `path`, optionally linearizing the written file.
    ///
    /// Objects no longer reachable from the trailer are pruned first so that
    /// removed metadata containers are not written out as orphans.
    #[instrument(skip(self, linearizer))]
    pub fn save(&mut self, path: &Path, linearizer: Option<&Linearizer>) -> Result<SaveOutcome> {
        let pruned_objects = self.inner.prune_objects().len();

        self.inner.save(path).map_err(|e| Error::write(path, e))?;
        debug!("Wrote {} (pruned {} objects)", path.display(), pruned_objects);

        let linearization = match linearizer {
            Some(linearizer) => {
                let outcome = linearizer
                    .linearize_in_place(path)
                    .map_err(|e| Error::write(path, e))?;
                self.linearized = match outcome {
                    LinearizeOutcome::Unavailable => Some(false),
                    _ => Some(true),
                };
                Some(outcome)
            }
            None => {
                self.linearized = Some(false);
                None
            }
        };

        Ok(SaveOutcome {
            pruned_objects,
            linearization,
        })
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding)
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| pdf_doc_char(b)).collect()
}

fn pdf_doc_char(byte: u8) -> char {
    const HIGH: [char; 33] = [
        '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
        '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
        '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
        '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
        '\u{20AC}',
    ];
    match byte {
        0x80..=0xA0 => HIGH[(byte - 0x80) as usize],
        other => other as char,
    }
}

/// Render a catalog or Info value by its bare name (`/UseOutlines` -> `UseOutlines`)
pub fn bare_name(object: &Object) -> Option<String> {
    match object {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::String(bytes, _) => Some(decode_text_string(bytes).trim_start_matches('/').to_string()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}
