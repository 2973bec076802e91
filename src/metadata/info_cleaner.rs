//! Info dictionary cleaner for PDF metadata

use lopdf::{Object, ObjectId};
use tracing::debug;

use crate::pdf_document::PdfDocument;
use crate::types::{object_ref, WarningCollector, WarningScope};

/// Cleans the legacy Info record referenced from the trailer
#[derive(Debug, Default, Clone)]
pub struct InfoCleaner;

impl InfoCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Remove the trailer `Info` entry outright.
    ///
    /// Returns whether an entry was removed, plus the object id it referenced
    /// (inline Info dictionaries have none).
    pub fn remove_from_trailer(&self, document: &mut PdfDocument) -> (bool, Option<ObjectId>) {
        match document.trailer_mut().remove(b"Info") {
            Some(Object::Reference(id)) => (true, Some(id)),
            Some(_) => (true, None),
            None => (false, None),
        }
    }

    /// Remove every key from the Info dictionary at `id`, if that object is
    /// still in the document. Returns the number of keys removed.
    pub fn clear_keys(&self, document: &mut PdfDocument, id: ObjectId, warnings: &mut WarningCollector) -> usize {
        let dict = match document.document_mut().get_object_mut(id) {
            Ok(Object::Dictionary(dict)) => dict,
            Ok(_) => {
                warnings.push(WarningScope::Info, object_ref(id), "Info record is not a dictionary");
                return 0;
            }
            Err(_) => return 0,
        };

        let keys: Vec<Vec<u8>> = dict.iter().map(|(k, _)| k.clone()).collect();
        for key in &keys {
            dict.remove(key);
        }
        if !keys.is_empty() {
            debug!("Cleared {} legacy Info keys from {}", keys.len(), object_ref(id));
        }
        keys.len()
    }
}
