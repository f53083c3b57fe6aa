//! File records and per-file processing outcomes

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::FileCategory;

/// Bucket key for files whose name carries no usable extension
pub const NO_EXTENSION: &str = "other";

/// A file discovered by the classifier. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path as discovered under the walked root
    pub path: PathBuf,
    /// Lower-cased extension, or [`NO_EXTENSION`]
    pub extension: String,
}

impl FileRecord {
    /// Build a record, deriving the extension from the final path segment
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self { path, extension }
    }

    pub fn category(&self) -> FileCategory {
        FileCategory::from_extension(&self.extension)
    }

    /// File name without its extension, used to name derived outputs
    pub fn stem(&self) -> String {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem.to_string(),
            _ => name,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Substring after the last `.` of the file name, lower-cased.
///
/// Names without a dot, dot-files such as `.env`, and names ending in a dot
/// all map to [`NO_EXTENSION`].
pub fn extension_of(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return NO_EXTENSION.to_string(),
    };

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => NO_EXTENSION.to_string(),
    }
}

/// What happened to a processed input file afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposal {
    /// Original input moved under the originals root
    Moved(PathBuf),
    /// Derived file deleted
    Deleted,
    /// Disposal failed; the file is still where it was
    Retained(String),
}

/// Status of one file after a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Converted or expanded successfully
    Processed { disposal: Disposal },
    /// Deliberately not processed; left in place
    Skipped { reason: String },
    /// Processing failed; left in place
    Failed { stage: String, message: String },
}

/// Outcome of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub extension: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl FileOutcome {
    pub fn processed(record: &FileRecord, disposal: Disposal) -> Self {
        Self {
            path: record.path.clone(),
            extension: record.extension.clone(),
            status: OutcomeStatus::Processed { disposal },
        }
    }

    pub fn skipped(record: &FileRecord, reason: impl Into<String>) -> Self {
        Self {
            path: record.path.clone(),
            extension: record.extension.clone(),
            status: OutcomeStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(record: &FileRecord, stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: record.path.clone(),
            extension: record.extension.clone(),
            status: OutcomeStatus::Failed {
                stage: stage.into(),
                message: message.into(),
            },
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Processed { .. })
    }
}

/// Ordered outcomes of one intake run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub outcomes: Vec<FileOutcome>,
}

impl ProcessingReport {
    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = FileOutcome>) {
        self.outcomes.extend(outcomes);
    }

    /// Successfully processed paths, in the order their buckets were drained
    pub fn processed(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|o| o.is_processed())
            .map(|o| o.path.clone())
            .collect()
    }

    /// Successfully processed paths of one extension bucket
    pub fn processed_for(&self, extension: &str) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter(|o| o.is_processed() && o.extension == extension)
            .map(|o| o.path.clone())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b/Report.DOCX")), "docx");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), "gz");
        assert_eq!(extension_of(Path::new("Makefile")), NO_EXTENSION);
        assert_eq!(extension_of(Path::new(".env")), NO_EXTENSION);
        assert_eq!(extension_of(Path::new("trailing.")), NO_EXTENSION);
        assert_eq!(extension_of(Path::new("dir.v2/readme")), NO_EXTENSION);
    }

    #[test]
    fn test_stem() {
        assert_eq!(FileRecord::new("raw/test02.zip").stem(), "test02");
        assert_eq!(FileRecord::new("raw/a.b.docx").stem(), "a.b");
        assert_eq!(FileRecord::new("raw/README").stem(), "README");
    }

    #[test]
    fn test_report_filters() {
        let zip = FileRecord::new("raw/a.zip");
        let txt = FileRecord::new("raw/a/b.txt");
        let bad = FileRecord::new("raw/c.zip");

        let mut report = ProcessingReport::default();
        report.extend(vec![
            FileOutcome::processed(&zip, Disposal::Deleted),
            FileOutcome::failed(&bad, "unpack", "corrupt"),
            FileOutcome::processed(&txt, Disposal::Deleted),
        ]);

        assert_eq!(report.processed(), vec![zip.path.clone(), txt.path.clone()]);
        assert_eq!(report.processed_for("zip"), vec![zip.path.clone()]);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.skipped().count(), 0);
    }
}
