//! Point-in-time property snapshot of a document, used for before/after reporting

use std::fmt;

use serde::Serialize;

pub const NONE: &str = "None";
pub const NOT_SET: &str = "Not Set";
pub const UNKNOWN: &str = "Unknown";

/// Yes/No fact that may not be determinable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flag {
    Yes,
    No,
    Unknown,
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Flag::Yes
        } else {
            Flag::No
        }
    }
}

impl From<Option<bool>> for Flag {
    fn from(value: Option<bool>) -> Self {
        value.map(Flag::from).unwrap_or(Flag::Unknown)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
            Flag::Unknown => UNKNOWN,
        };
        f.write_str(s)
    }
}

/// Collapse state of the bookmark tree, judged from the first top-level bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookmarkState {
    NoBookmarks,
    NoChildren,
    Collapsed,
    Expanded,
    Unknown,
}

impl fmt::Display for BookmarkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookmarkState::NoBookmarks => "No Bookmarks",
            BookmarkState::NoChildren => "No Children",
            BookmarkState::Collapsed => "Collapsed",
            BookmarkState::Expanded => "Expanded",
            BookmarkState::Unknown => UNKNOWN,
        };
        f.write_str(s)
    }
}

/// Canonical facts extracted from a document.
///
/// Never mutated once built; compare two snapshots with
/// [`PropertySnapshot::normalized_eq`] or [`PropertySnapshot::properties`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySnapshot {
    pub fast_web_view: Flag,
    pub navigation_mode: String,
    pub page_layout: String,
    pub tagged_pdf: Flag,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: String,
    pub creator: String,
    pub producer: String,
    pub xmp_metadata: Flag,
    pub child_bookmarks: BookmarkState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PropertySnapshot {
    /// Snapshot for a file that could not be opened at all
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            fast_web_view: Flag::Unknown,
            navigation_mode: UNKNOWN.to_string(),
            page_layout: UNKNOWN.to_string(),
            tagged_pdf: Flag::Unknown,
            title: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            subject: UNKNOWN.to_string(),
            keywords: UNKNOWN.to_string(),
            creator: UNKNOWN.to_string(),
            producer: UNKNOWN.to_string(),
            xmp_metadata: Flag::Unknown,
            child_bookmarks: BookmarkState::Unknown,
            error: Some(reason.into()),
        }
    }

    /// Report rows in a fixed order. `Error` is only present for unreadable files.
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Fast Web View", self.fast_web_view.to_string()),
            ("Page Mode", self.navigation_mode.clone()),
            ("Page Layout", self.page_layout.clone()),
            ("Tagged PDF", self.tagged_pdf.to_string()),
            ("Title", self.title.clone()),
            ("Author", self.author.clone()),
            ("Subject", self.subject.clone()),
            ("Keywords", self.keywords.clone()),
            ("Creator", self.creator.clone()),
            ("Producer", self.producer.clone()),
            ("XMP Metadata", self.xmp_metadata.to_string()),
            ("Child Bookmarks", self.child_bookmarks.to_string()),
        ];
        if let Some(error) = &self.error {
            rows.push(("Error", error.clone()));
        }
        rows
    }

    /// Equality over every normalized or scrubbed field
    pub fn normalized_eq(&self, other: &Self) -> bool {
        self.fast_web_view == other.fast_web_view
            && self.navigation_mode == other.navigation_mode
            && self.page_layout == other.page_layout
            && self.tagged_pdf == other.tagged_pdf
            && self.metadata_values() == other.metadata_values()
            && self.xmp_metadata == other.xmp_metadata
            && self.child_bookmarks == other.child_bookmarks
    }

    /// True when no Info field and no XMP stream survived
    pub fn is_scrubbed(&self) -> bool {
        self.metadata_values().iter().all(|v| *v == NONE) && self.xmp_metadata == Flag::No
    }

    fn metadata_values(&self) -> [&str; 6] {
        [
            self.title.as_str(),
            self.author.as_str(),
            self.subject.as_str(),
            self.keywords.as_str(),
            self.creator.as_str(),
            self.producer.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_snapshot_reports_error_row() {
        let snapshot = PropertySnapshot::unreadable("not a PDF");
        let rows = snapshot.properties();
        assert_eq!(rows.len(), 13);
        assert_eq!(rows.last().map(|(k, _)| *k), Some("Error"));
        assert!(rows.iter().take(12).all(|(_, v)| v == UNKNOWN));
        assert!(!snapshot.is_scrubbed());
    }

    #[test]
    fn test_normalized_eq_ignores_error_text() {
        let a = PropertySnapshot::unreadable("first");
        let b = PropertySnapshot::unreadable("second");
        assert!(a.normalized_eq(&b));
        assert_ne!(a, b);
    }
}
