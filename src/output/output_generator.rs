//! Two-phase output writer
//!
//! The writer may add its own producer or date entries while saving, which
//! would undo the scrub. Output is therefore written in two phases: save
//! (linearized), reopen the written file, scrub again, save (linearized) again.
//! The second save is linearized too because a plain rewrite drops the
//! linearized layout.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::metadata::{MetadataCleaner, ScrubStats};
use crate::pdf_document::{PdfDocument, SaveOutcome};
use crate::structure::linearization::{LinearizeOutcome, Linearizer};
use crate::types::{WarningCollector, WarningScope};

/// What the two phases did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PersistOutcome {
    /// Metadata the writer injected during the first save, removed on reopen
    pub rescrub: ScrubStats,
    pub linearized: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OutputGenerator {
    metadata_cleaner: MetadataCleaner,
    linearizer: Option<Linearizer>,
}

impl OutputGenerator {
    pub fn new(linearizer: Option<Linearizer>) -> Self {
        Self {
            metadata_cleaner: MetadataCleaner::new(),
            linearizer,
        }
    }

    /// Persist `document` to `destination`.
    ///
    /// Takes the document by value: it is dropped after the first phase so
    /// that only the reopened copy is alive during the second.
    #[instrument(skip(self, document, warnings))]
    pub fn persist(
        &self,
        document: PdfDocument,
        destination: &Path,
        warnings: &mut WarningCollector,
    ) -> Result<PersistOutcome> {
        // Phase 1
        {
            let mut document = document;
            document.save(destination, self.linearizer.as_ref())?;
        }

        // Phase 2: reopen the same path and strip what the writer added
        let mut reopened = PdfDocument::open(destination)?;
        let rescrub = self.metadata_cleaner.scrub(&mut reopened, warnings);
        if rescrub.removed_anything() {
            debug!("Writer-injected metadata removed after first save: {:?}", rescrub);
        }
        let outcome = reopened.save(destination, self.linearizer.as_ref())?;
        let linearized = self.note_linearization(&outcome, warnings);

        info!("Saved {}{}", destination.display(), if linearized { " (linearized)" } else { "" });
        Ok(PersistOutcome { rescrub, linearized })
    }

    /// Records non-fatal linearization problems; returns whether the file is linearized
    fn note_linearization(&self, outcome: &SaveOutcome, warnings: &mut WarningCollector) -> bool {
        match &outcome.linearization {
            Some(LinearizeOutcome::Linearized) => true,
            Some(LinearizeOutcome::LinearizedWithWarnings(message)) => {
                warnings.push(WarningScope::Save, "qpdf", message.clone());
                true
            }
            Some(LinearizeOutcome::Unavailable) => {
                warnings.push(WarningScope::Save, "qpdf", "qpdf not found; output is not linearized");
                false
            }
            None => false,
        }
    }
}
