//! Linearization ("fast web view") detection and qpdf-backed linearization

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// The linearization dictionary must lie entirely within the first 1024 bytes
const LINEARIZATION_WINDOW: usize = 1024;

/// qpdf exits with 3 when it succeeded but printed warnings
const QPDF_EXIT_WARNINGS: i32 = 3;

/// Linearization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearizationConfig {
    /// Write linearized output at all
    pub enabled: bool,
    /// Treat a missing qpdf binary as a write failure instead of a warning
    pub required: bool,
    /// qpdf executable; looked up on PATH when relative
    pub qpdf_path: PathBuf,
}

impl Default for LinearizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            required: false,
            qpdf_path: PathBuf::from("qpdf"),
        }
    }
}

/// Result of a linearization attempt that did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearizeOutcome {
    Linearized,
    /// qpdf linearized the file but reported warnings
    LinearizedWithWarnings(String),
    /// qpdf is not installed; the file was left as written
    Unavailable,
}

/// Rewrites files in place using qpdf
#[derive(Debug, Clone)]
pub struct Linearizer {
    program: PathBuf,
    required: bool,
}

impl Linearizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            required: false,
        }
    }

    pub fn from_config(config: &LinearizationConfig) -> Option<Self> {
        config.enabled.then(|| Self {
            program: config.qpdf_path.clone(),
            required: config.required,
        })
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Linearize `path`, replacing the file
    #[instrument(skip(self))]
    pub fn linearize_in_place(&self, path: &Path) -> Result<LinearizeOutcome> {
        let output = Command::new(&self.program)
            .arg("--linearize")
            .arg("--replace-input")
            .arg(path)
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound && !self.required => {
                debug!("{} not found, leaving {} unlinearized", self.program.display(), path.display());
                return Ok(LinearizeOutcome::Unavailable);
            }
            Err(e) => {
                return Err(Error::LinearizationError(format!(
                    "failed to execute {}: {}",
                    self.program.display(),
                    e
                )))
            }
        };

        match output.status.code() {
            Some(0) => Ok(LinearizeOutcome::Linearized),
            Some(QPDF_EXIT_WARNINGS) => Ok(LinearizeOutcome::LinearizedWithWarnings(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
            code => Err(Error::LinearizationError(format!(
                "qpdf failed (exit code {}): {}",
                code.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

/// Detects a linearization dictionary at the start of a file.
///
/// Returns `None` when the bytes do not look like a PDF at all, so the caller
/// can report the flag as undeterminable.
pub fn detect_linearized(data: &[u8]) -> Option<bool> {
    let header_start = find(data, b"%PDF-")?;
    if header_start > LINEARIZATION_WINDOW {
        return None;
    }

    let window = &data[..data.len().min(LINEARIZATION_WINDOW)];
    let first_obj = match find(window, b" obj") {
        Some(pos) => pos,
        None => return Some(false),
    };
    let body = &window[first_obj..];
    let end = find(body, b"endobj").unwrap_or(body.len());

    Some(find(&body[..end], b"/Linearized").is_some())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
