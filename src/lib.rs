//! Batch normalizer for PDF viewing metadata
//! Sets navigation and layout defaults, collapses bookmark trees to a chosen
//! depth, strips author/producer/XMP metadata and tagged structure, and writes
//! linearized copies with a before/after property report.

// Configuration and core pipeline
pub mod config;
pub mod error;
pub mod pdf_document;
pub mod pipeline;
pub mod types;
pub mod utils;

// Discovery
pub mod scanner;

// Inspection
pub mod analyzer;

// Structure: catalog, outline tree, linearization
pub mod structure;

// Metadata removal
pub mod metadata;

// Output generation
pub mod output;

// Reporting
pub mod report;

pub use analyzer::PropertyInspector;
pub use config::ProcessingConfig;
pub use error::{Error, Result, StructureError};
pub use metadata::{MetadataCleaner, ScrubStats};
pub use output::{OutputGenerator, PersistOutcome};
pub use pdf_document::PdfDocument;
pub use pipeline::{describe_visibility, BatchSummary, FileOutcome, Pipeline};
pub use report::{ReportCollector, ReportData, ReportFormat, ReportGenerator};
pub use scanner::PdfScanner;
pub use structure::{
    linearization::{LinearizationConfig, LinearizeOutcome, Linearizer},
    outline::{OutlineEditor, OutlineTree, VisibilityStats},
    structure_handler::{NormalizeStats, StructureHandler},
};
pub use types::{BookmarkState, Flag, PropertySnapshot, StructuralWarning, WarningCollector, WarningScope};
pub use utils::{init_logging, LogLevel};
