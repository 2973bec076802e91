//! Metadata scrubber
//!
//! Removes author, producer and XMP metadata from a document in place. Every
//! step is best-effort: a failing step is recorded as a warning and the
//! following steps still run. Calling [`MetadataCleaner::scrub`] again is a
//! no-op, which is what lets the save protocol re-run it after a writer pass.

use lopdf::Object;
use serde::Serialize;
use tracing::{debug, instrument};

use super::info_cleaner::InfoCleaner;
use super::xmp_cleaner::XmpCleaner;
use crate::pdf_document::PdfDocument;
use crate::types::{WarningCollector, WarningScope};

/// What a single scrub pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrubStats {
    pub metadata_stream_removed: bool,
    pub xmp_properties_removed: usize,
    pub info_removed: bool,
    pub legacy_keys_removed: usize,
}

impl ScrubStats {
    pub fn removed_anything(&self) -> bool {
        self.metadata_stream_removed
            || self.xmp_properties_removed > 0
            || self.info_removed
            || self.legacy_keys_removed > 0
    }
}

#[derive(Debug, Default, Clone)]
pub struct MetadataCleaner {
    xmp_cleaner: XmpCleaner,
    info_cleaner: InfoCleaner,
}

impl MetadataCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all)]
    pub fn scrub(&self, document: &mut PdfDocument, warnings: &mut WarningCollector) -> ScrubStats {
        let mut stats = ScrubStats::default();

        // 1. Drop the catalog's reference to the XMP stream
        let mut xmp_stream = None;
        match document.catalog_mut() {
            Ok(catalog) => {
                if let Some(metadata) = catalog.remove(b"Metadata") {
                    stats.metadata_stream_removed = true;
                    if let Object::Reference(id) = metadata {
                        xmp_stream = Some(id);
                    }
                }
            }
            Err(e) => warnings.push(
                WarningScope::Metadata,
                "/Root",
                format!("cannot remove metadata stream: {}", e),
            ),
        }

        // 2. Empty the packet itself in case anything else still points at it.
        // Page- and image-level packets are left alone.
        if let Some(id) = xmp_stream {
            stats.xmp_properties_removed = self.xmp_cleaner.clear_stream(document, id, warnings);
        }

        // 3. Drop the trailer's Info entry
        let (info_removed, info_id) = self.info_cleaner.remove_from_trailer(document);
        stats.info_removed = info_removed;

        // 4. Clear the legacy Info record if it is still reachable
        if let Some(id) = info_id {
            stats.legacy_keys_removed = self.info_cleaner.clear_keys(document, id, warnings);
        }

        debug!("Metadata scrub: {:?}", stats);
        stats
    }
}
