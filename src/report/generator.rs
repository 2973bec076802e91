//! Report file writer

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, instrument};

use super::{ReportData, ReportFormat, ReportFormatter};
use crate::error::{Error, Result};

/// Writes rendered reports to disk
pub struct ReportGenerator;

impl ReportGenerator {
    /// `processing_report_<YYYYmmdd_HHMMSS>.<ext>`
    pub fn file_name(format: ReportFormat) -> String {
        format!("processing_report_{}.{}", Local::now().format("%Y%m%d_%H%M%S"), format.extension())
    }

    /// Render `data` and write it into `directory`; returns the written path
    #[instrument(skip(data))]
    pub fn write(data: &ReportData, directory: &Path, format: ReportFormat) -> Result<PathBuf> {
        let content = ReportFormatter::format(data, format)?;
        fs::create_dir_all(directory)
            .map_err(|e| Error::ReportError(format!("Cannot create {}: {}", directory.display(), e)))?;

        let path = directory.join(Self::file_name(format));
        fs::write(&path, content).map_err(|e| Error::ReportError(format!("Cannot write {}: {}", path.display(), e)))?;

        info!("Report written to {}", path.display());
        Ok(path)
    }
}
