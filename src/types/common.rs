//! Shared catalog vocabulary and the structural warning collector

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Catalog `PageMode` values (the viewer's navigation tab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationMode {
    UseNone,
    UseOutlines,
    UseThumbs,
    FullScreen,
    UseOC,
    UseAttachments,
}

impl NavigationMode {
    pub fn as_name(&self) -> &'static [u8] {
        match self {
            NavigationMode::UseNone => b"UseNone",
            NavigationMode::UseOutlines => b"UseOutlines",
            NavigationMode::UseThumbs => b"UseThumbs",
            NavigationMode::FullScreen => b"FullScreen",
            NavigationMode::UseOC => b"UseOC",
            NavigationMode::UseAttachments => b"UseAttachments",
        }
    }
}

/// Catalog `PageLayout` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLayout {
    SinglePage,
    OneColumn,
    TwoColumnLeft,
    TwoColumnRight,
    TwoPageLeft,
    TwoPageRight,
}

impl PageLayout {
    pub fn as_name(&self) -> &'static [u8] {
        match self {
            PageLayout::SinglePage => b"SinglePage",
            PageLayout::OneColumn => b"OneColumn",
            PageLayout::TwoColumnLeft => b"TwoColumnLeft",
            PageLayout::TwoColumnRight => b"TwoColumnRight",
            PageLayout::TwoPageLeft => b"TwoPageLeft",
            PageLayout::TwoPageRight => b"TwoPageRight",
        }
    }
}

/// Keys of the legacy Info record that are reported and scrubbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoKey {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
    Producer,
}

impl InfoKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoKey::Title => "Title",
            InfoKey::Author => "Author",
            InfoKey::Subject => "Subject",
            InfoKey::Keywords => "Keywords",
            InfoKey::Creator => "Creator",
            InfoKey::Producer => "Producer",
        }
    }
}

/// Area of the document a warning was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningScope {
    Catalog,
    Outline,
    Metadata,
    Xmp,
    Info,
    Save,
}

impl fmt::Display for WarningScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self {
            WarningScope::Catalog => "catalog",
            WarningScope::Outline => "outline",
            WarningScope::Metadata => "metadata",
            WarningScope::Xmp => "xmp",
            WarningScope::Info => "info",
            WarningScope::Save => "save",
        };
        write!(f, "{}", scope)
    }
}

/// A node- or field-level problem that was skipped over
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralWarning {
    pub scope: WarningScope,
    /// Object reference or key the problem was found at, e.g. `12 0 R` or `/Info`
    pub location: String,
    pub message: String,
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.scope, self.location, self.message)
    }
}

/// Collects structural warnings for one document.
///
/// Passed by `&mut` through the outline walk, the scrubber and the save
/// protocol so that callers (and tests) can see exactly what was skipped.
#[derive(Debug, Default, Clone)]
pub struct WarningCollector {
    warnings: Vec<StructuralWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: WarningScope, location: impl Into<String>, message: impl Into<String>) {
        let warning = StructuralWarning {
            scope,
            location: location.into(),
            message: message.into(),
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.warnings
    }

    pub fn in_scope(&self, scope: WarningScope) -> impl Iterator<Item = &StructuralWarning> {
        self.warnings.iter().filter(move |w| w.scope == scope)
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<StructuralWarning> {
        self.warnings
    }
}

/// Formats an object id the way it appears in a PDF file
pub fn object_ref(id: lopdf::ObjectId) -> String {
    format!("{} {} R", id.0, id.1)
}
