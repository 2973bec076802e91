//! Catalog-level normalization
//!
//! Sets the navigation tab and page layout, collapses the bookmark tree to the
//! configured depth, removes tagged-structure markers and scrubs metadata.

use lopdf::{Dictionary, Object};
use serde::Serialize;
use tracing::{info, instrument};

use super::outline::{OutlineEditor, VisibilityStats, DEFAULT_MAX_VISITS};
use crate::error::Result;
use crate::metadata::{MetadataCleaner, ScrubStats};
use crate::pdf_document::PdfDocument;
use crate::types::{NavigationMode, PageLayout, WarningCollector, WarningScope};

/// Summary of one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    pub viewer_preferences_created: bool,
    pub has_bookmarks: bool,
    pub tag_markers_removed: usize,
    pub visibility: VisibilityStats,
    pub scrub: ScrubStats,
}

#[derive(Debug, Clone)]
pub struct StructureHandler {
    metadata_cleaner: MetadataCleaner,
    max_outline_visits: usize,
}

impl Default for StructureHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureHandler {
    pub fn new() -> Self {
        Self {
            metadata_cleaner: MetadataCleaner::new(),
            max_outline_visits: DEFAULT_MAX_VISITS,
        }
    }

    pub fn with_max_outline_visits(mut self, max_visits: usize) -> Self {
        self.max_outline_visits = max_visits;
        self
    }

    /// Normalize `document` in place.
    ///
    /// Fails only when the catalog itself cannot be resolved.
    #[instrument(skip(self, document, warnings))]
    pub fn normalize(
        &self,
        document: &mut PdfDocument,
        visible_levels: u32,
        warnings: &mut WarningCollector,
    ) -> Result<NormalizeStats> {
        let mut stats = NormalizeStats::default();

        {
            let catalog = document.catalog_mut()?;
            if !catalog.has(b"ViewerPreferences") {
                catalog.set("ViewerPreferences", Dictionary::new());
                stats.viewer_preferences_created = true;
            }
        }

        stats.has_bookmarks = document.has_bookmarks();
        let navigation = if stats.has_bookmarks {
            NavigationMode::UseOutlines
        } else {
            NavigationMode::UseNone
        };
        document
            .catalog_mut()?
            .set("PageMode", Object::Name(navigation.as_name().to_vec()));

        if stats.has_bookmarks {
            match document.editable_outline_root() {
                Some(root) => {
                    let editor = OutlineEditor::new(visible_levels).with_max_visits(self.max_outline_visits);
                    stats.visibility = editor.apply_visibility(document, root, warnings);
                }
                None => warnings.push(
                    WarningScope::Catalog,
                    "/Outlines",
                    "outline root cannot be resolved; bookmarks left as they are",
                ),
            }
        }

        let catalog = document.catalog_mut()?;
        catalog.set("PageLayout", Object::Name(PageLayout::SinglePage.as_name().to_vec()));

        for marker in [b"MarkInfo".as_slice(), b"StructTreeRoot".as_slice()] {
            if catalog.remove(marker).is_some() {
                stats.tag_markers_removed += 1;
            }
        }

        stats.scrub = self.metadata_cleaner.scrub(document, warnings);

        info!(
            "Normalized catalog: mode {:?}, {} tag markers removed, {} bookmarks collapsed",
            navigation, stats.tag_markers_removed, stats.visibility.collapsed
        );
        Ok(stats)
    }
}
