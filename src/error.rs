//! Error types and handling for the PDF normalization library

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for normalization operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type. Every variant is a file-level (or process-level) failure;
/// node- and field-level problems are collected as [`crate::types::StructuralWarning`]s instead.
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Failed to open {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write {}: {reason}", path.display())]
    WriteError { path: PathBuf, reason: String },

    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("PDF structure error: {0}")]
    StructureError(#[from] StructureError),

    #[error("Linearization error: {0}")]
    LinearizationError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ParseError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::WriteError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Short category used in batch summaries
    pub fn category(&self) -> &'static str {
        match self {
            Error::ParseError { .. } => "parse",
            Error::WriteError { .. } => "write",
            Error::UsageError(_) => "usage",
            Error::ConfigError(_) => "config",
            Error::StructureError(_) => "structure",
            Error::LinearizationError(_) => "linearization",
            Error::ReportError(_) => "report",
            Error::IoError(_) => "io",
        }
    }
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StructureError {
    #[error("Trailer has no Root entry")]
    MissingRoot,

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}
