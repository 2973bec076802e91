//! Structural editing: outline visibility, catalog normalization, linearization

pub mod linearization;
pub mod outline;
pub mod structure_handler;

pub use linearization::{detect_linearized, LinearizationConfig, LinearizeOutcome, Linearizer};
pub use outline::{OutlineEditor, OutlineNode, OutlineTree, VisibilityStats};
pub use structure_handler::{NormalizeStats, StructureHandler};
