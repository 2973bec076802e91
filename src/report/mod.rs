//! Before/after property report
//!
//! Rows are keyed by the file's path relative to the batch root so that two
//! files with the same name in different folders never collide, and so that
//! output order does not depend on the order workers finish in.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::PropertySnapshot;

pub mod formatter;
pub mod generator;

pub use formatter::ReportFormatter;
pub use generator::ReportGenerator;

/// Report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ReportFormat::Csv,
        }
    }
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(Error::UsageError(format!("Unknown report format: {}", other))),
        }
    }
}

/// One property's value before and after processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyComparison {
    pub property: String,
    pub before: String,
    pub after: String,
}

/// Relative file path -> ordered property comparisons
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportData {
    pub files: BTreeMap<String, Vec<PropertyComparison>>,
}

impl ReportData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair up two snapshots property by property. A property present on only
    /// one side (the `Error` row) gets an empty cell on the other.
    pub fn add_file(&mut self, key: impl Into<String>, before: &PropertySnapshot, after: &PropertySnapshot) {
        let mut rows: Vec<PropertyComparison> = before
            .properties()
            .into_iter()
            .map(|(property, value)| PropertyComparison {
                property: property.to_string(),
                before: value,
                after: String::new(),
            })
            .collect();

        for (property, value) in after.properties() {
            match rows.iter_mut().find(|row| row.property == property) {
                Some(row) => row.after = value,
                None => rows.push(PropertyComparison {
                    property: property.to_string(),
                    before: String::new(),
                    after: value,
                }),
            }
        }

        self.files.insert(key.into(), rows);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[PropertyComparison]> {
        self.files.get(key).map(Vec::as_slice)
    }
}

/// Thread-safe accumulator shared by batch workers
#[derive(Debug, Default)]
pub struct ReportCollector {
    data: Mutex<ReportData>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: impl Into<String>, before: &PropertySnapshot, after: &PropertySnapshot) {
        self.data.lock().add_file(key, before, after);
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    pub fn into_data(self) -> ReportData {
        self.data.into_inner()
    }
}
