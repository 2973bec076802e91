//! Configuration types and validation for the pipeline

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::report::ReportConfig;
use crate::structure::linearization::LinearizationConfig;
use crate::structure::outline::DEFAULT_MAX_VISITS;

/// Name of the per-directory output folder; paths under it are never inputs
pub const DEFAULT_OUTPUT_DIR: &str = "processed";

/// Global pipeline execution config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Bookmark levels left expanded (0 = all, 1 = top level only, ...)
    pub visible_levels: u32,
    pub output_dir_name: String,
    /// Worker threads; 1 processes files sequentially
    pub jobs: usize,
    pub max_outline_visits: usize,
    pub linearization: LinearizationConfig,
    pub report: ReportConfig,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            visible_levels: 1,
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            jobs: 1,
            max_outline_visits: DEFAULT_MAX_VISITS,
            linearization: LinearizationConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl ProcessingConfig {
    /// Load a JSON or YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Parse JSON first, then YAML
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| Error::ConfigError(format!("Config parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_dir_name.is_empty()
            || self.output_dir_name.contains(['/', '\\'])
            || self.output_dir_name == "."
            || self.output_dir_name == ".."
        {
            return Err(Error::ConfigError(format!(
                "output_dir_name must be a single directory name, got {:?}",
                self.output_dir_name
            )));
        }
        if self.jobs == 0 {
            return Err(Error::ConfigError("jobs must be at least 1".into()));
        }
        if self.max_outline_visits == 0 {
            return Err(Error::ConfigError("max_outline_visits must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProcessingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.visible_levels, 1);
        assert_eq!(config.output_dir_name, "processed");
        assert!(config.linearization.enabled);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ProcessingConfig::from_str(r#"{ "visible_levels": 3, "report": { "format": "json" } }"#).unwrap();
        assert_eq!(config.visible_levels, 3);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(config.report.enabled);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "visible_levels: 0\njobs: 4\nlinearization:\n  enabled: false\n";
        let config = ProcessingConfig::from_str(yaml).unwrap();
        assert_eq!(config.visible_levels, 0);
        assert_eq!(config.jobs, 4);
        assert!(!config.linearization.enabled);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(ProcessingConfig::from_str("jobs: 0\n").is_err());
        assert!(ProcessingConfig::from_str("output_dir_name: a/b\n").is_err());
        assert!(ProcessingConfig::from_str("visible_levels: -1\n").is_err());
    }
}
