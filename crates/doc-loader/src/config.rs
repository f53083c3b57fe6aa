//! Configuration for the intake pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main loader configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Data directory layout
    #[serde(default)]
    pub data: DataDirsConfig,
    /// Archive expansion limits
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// External PDF analyzer
    #[serde(default)]
    pub pdf: PdfConfig,
    /// Logging defaults
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration with all three data directories under `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            data: DataDirsConfig::under(root),
            ..Self::default()
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.archive.max_depth == 0 {
            return Err(Error::Config("archive.max_depth must be at least 1".to_string()));
        }
        if self.pdf.enabled && self.pdf.command.trim().is_empty() {
            return Err(Error::Config("pdf.command must not be empty".to_string()));
        }
        let dirs = [&self.data.raw_dir, &self.data.processed_dir, &self.data.originals_dir];
        for (i, a) in dirs.iter().enumerate() {
            for b in dirs.iter().skip(i + 1) {
                if a == b {
                    return Err(Error::Config(format!(
                        "data directories must be distinct, {} is used twice",
                        a.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Locations of the raw, processed and originals roots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDirsConfig {
    /// Intake directory
    pub raw_dir: PathBuf,
    /// Converted output directory
    pub processed_dir: PathBuf,
    /// Disposed originals, one subdirectory per category
    pub originals_dir: PathBuf,
}

impl DataDirsConfig {
    /// Standard layout under a single root
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            raw_dir: root.join("raw"),
            processed_dir: root.join("processed"),
            originals_dir: root.join("originals"),
        }
    }
}

impl Default for DataDirsConfig {
    fn default() -> Self {
        Self::under("./Data")
    }
}

/// Archive expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Maximum nesting depth (top-level archives are depth 1)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Skip nested archives whose content matches one of their ancestors
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,
}

fn default_max_depth() -> usize { 16 }
fn default_detect_cycles() -> bool { true }

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            detect_cycles: default_detect_cycles(),
        }
    }
}

/// External PDF layout analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Run the analyzer at all; disabled PDFs are skipped and left in place
    #[serde(default = "default_pdf_enabled")]
    pub enabled: bool,
    /// Analyzer executable
    #[serde(default = "default_pdf_command")]
    pub command: String,
    /// Leading arguments; the input path and `-` (stdout) are appended
    #[serde(default = "default_pdf_args")]
    pub args: Vec<String>,
}

fn default_pdf_enabled() -> bool { true }
fn default_pdf_command() -> String { "pdftotext".to_string() }
fn default_pdf_args() -> Vec<String> { vec!["-layout".to_string()] }

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            enabled: default_pdf_enabled(),
            command: default_pdf_command(),
            args: default_pdf_args(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "doc_loader=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
