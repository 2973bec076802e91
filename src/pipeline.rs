//! Per-file processing and batch orchestration
//!
//! Each file goes through the same four steps:
//! inspect (before) -> normalize -> persist (two-phase save) -> inspect (after).
//! A failure in one file is recorded and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::analyzer::PropertyInspector;
use crate::config::ProcessingConfig;
use crate::error::{Error, Result};
use crate::output::{OutputGenerator, PersistOutcome};
use crate::pdf_document::PdfDocument;
use crate::report::{ReportCollector, ReportGenerator};
use crate::scanner::PdfScanner;
use crate::structure::linearization::Linearizer;
use crate::structure::structure_handler::{NormalizeStats, StructureHandler};
use crate::types::{PropertySnapshot, StructuralWarning, WarningCollector};

/// Everything known about one successfully processed file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub before: PropertySnapshot,
    pub after: PropertySnapshot,
    pub normalize: NormalizeStats,
    pub persist: PersistOutcome,
    pub warnings: Vec<StructuralWarning>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub warnings: usize,
    pub report_path: Option<PathBuf>,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Human description of a bookmark visibility setting
pub fn describe_visibility(visible_levels: u32) -> String {
    match visible_levels {
        0 => "All levels expanded".to_string(),
        1 => "Only top-level visible".to_string(),
        n => format!("{} levels visible", n),
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ProcessingConfig,
    scanner: PdfScanner,
    inspector: PropertyInspector,
    structure_handler: StructureHandler,
    output_generator: OutputGenerator,
}

impl Pipeline {
    pub fn new(config: ProcessingConfig) -> Self {
        let linearizer = Linearizer::from_config(&config.linearization);
        Self {
            scanner: PdfScanner::new(config.output_dir_name.clone()),
            inspector: PropertyInspector::new(),
            structure_handler: StructureHandler::new().with_max_outline_visits(config.max_outline_visits),
            output_generator: OutputGenerator::new(linearizer),
            config,
        }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// `<dir>/<output_dir_name>/<file name>`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        let mut output = parent.join(&self.config.output_dir_name);
        if let Some(name) = input.file_name() {
            output.push(name);
        }
        output
    }

    /// Process one file into `output`. The output's parent directory must exist.
    #[instrument(skip(self))]
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<FileOutcome> {
        let before = self.inspector.inspect_path(input);
        let mut warnings = WarningCollector::new();

        let mut document = PdfDocument::open(input)?;
        let normalize = self
            .structure_handler
            .normalize(&mut document, self.config.visible_levels, &mut warnings)?;
        let persist = self.output_generator.persist(document, output, &mut warnings)?;

        let after = self.inspector.inspect_path(output);

        Ok(FileOutcome {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            before,
            after,
            normalize,
            persist,
            warnings: warnings.into_warnings(),
        })
    }

    /// Discover and process every PDF under `root`, then write the report
    #[instrument(skip(self))]
    pub fn run_batch(&self, root: &Path) -> Result<BatchSummary> {
        let files = self.scanner.discover(root)?;
        let mut summary = BatchSummary {
            total: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            info!(
                "No PDF files found in '{}' (excluding '{}' folders)",
                root.display(),
                self.config.output_dir_name
            );
            return Ok(summary);
        }
        info!("Found {} PDF file(s) to process.", files.len());

        let collector = ReportCollector::new();
        let results: Vec<(PathBuf, Result<FileOutcome>)> = if self.config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
                .map_err(|e| Error::ConfigError(format!("Cannot start worker pool: {}", e)))?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|input| (input.clone(), self.process_entry(root, input, &collector)))
                    .collect()
            })
        } else {
            files
                .iter()
                .map(|input| (input.clone(), self.process_entry(root, input, &collector)))
                .collect()
        };

        for (input, result) in results {
            match result {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    summary.warnings += outcome.warnings.len();
                }
                Err(e) => summary.failed.push((input, e.to_string())),
            }
        }

        if self.config.report.enabled && !collector.is_empty() {
            let report_dir = self.output_path_for(&files[0]).parent().map(Path::to_path_buf).unwrap_or_default();
            match ReportGenerator::write(&collector.into_data(), &report_dir, self.config.report.format) {
                Ok(path) => {
                    info!("Comparison report generated: {}", display_relative(root, &path));
                    summary.report_path = Some(path);
                }
                Err(e) => error!("Failed to write report: {}", e),
            }
        }

        info!("{}", "=".repeat(60));
        info!("Processing complete!");
        info!("  Successful: {}", summary.succeeded);
        info!("  Failed: {}", summary.failed_count());
        info!("  Total: {}", summary.total);
        if summary.warnings > 0 {
            info!("  Warnings: {}", summary.warnings);
        }
        info!("{}", "=".repeat(60));

        Ok(summary)
    }

    fn process_entry(&self, root: &Path, input: &Path, collector: &ReportCollector) -> Result<FileOutcome> {
        let relative = display_relative(root, input);
        info!("Processing: {}", relative);

        let output = self.output_path_for(input);
        let result = match output.parent() {
            Some(dir) => fs::create_dir_all(dir).map_err(|e| Error::write(dir, e.to_string())),
            None => Ok(()),
        }
        .and_then(|_| self.process_file(input, &output));

        match &result {
            Ok(outcome) => {
                info!("  Saved to: {}", display_relative(root, &outcome.output));
                collector.record(relative, &outcome.before, &outcome.after);
            }
            Err(e) => warn!("  Failed ({}): {}: {}", e.category(), relative, e),
        }
        result
    }
}

/// `path` relative to `root`, `/`-separated on every platform
fn display_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_visibility() {
        assert_eq!(describe_visibility(0), "All levels expanded");
        assert_eq!(describe_visibility(1), "Only top-level visible");
        assert_eq!(describe_visibility(3), "3 levels visible");
    }

    #[test]
    fn test_output_path_for() {
        let pipeline = Pipeline::new(ProcessingConfig::default());
        assert_eq!(
            pipeline.output_path_for(Path::new("/data/reports/q3.pdf")),
            PathBuf::from("/data/reports/processed/q3.pdf")
        );
    }

    #[test]
    fn test_display_relative() {
        assert_eq!(display_relative(Path::new("/root"), Path::new("/root/a/b.pdf")), "a/b.pdf");
        assert_eq!(display_relative(Path::new("/root"), Path::new("/root/c.pdf")), "c.pdf");
    }
}
