//! File categories and the structured document element model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handler category a file extension routes to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    /// Compressed container (zip)
    Archive,
    /// PDF document
    Pdf,
    /// Comma separated values
    Csv,
    /// JSON document
    Json,
    /// Excel / OpenDocument spreadsheet
    Spreadsheet,
    /// Microsoft Word document (.docx)
    WordDocument,
    /// PNG image
    ImagePng,
    /// JPEG image
    ImageJpg,
    /// Plain text or markdown
    Text,
    /// Anything else
    Other,
}

impl FileCategory {
    /// Every category, in originals-subdirectory creation order
    pub const ALL: [FileCategory; 10] = [
        Self::Archive,
        Self::Pdf,
        Self::Csv,
        Self::Json,
        Self::Spreadsheet,
        Self::WordDocument,
        Self::ImagePng,
        Self::ImageJpg,
        Self::Text,
        Self::Other,
    ];

    /// Detect category from a lower-cased extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "zip" => Self::Archive,
            "pdf" => Self::Pdf,
            "csv" => Self::Csv,
            "json" => Self::Json,
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Self::Spreadsheet,
            "docx" => Self::WordDocument,
            "png" => Self::ImagePng,
            "jpg" | "jpeg" => Self::ImageJpg,
            "txt" | "text" | "md" | "markdown" => Self::Text,
            _ => Self::Other,
        }
    }

    /// Name of the originals subdirectory for this category
    pub fn subdir_name(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Spreadsheet => "xlsx",
            Self::WordDocument => "docx",
            Self::ImagePng => "png",
            Self::ImageJpg => "jpg",
            Self::Text => "txt",
            Self::Other => "other",
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive)
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.subdir_name())
    }
}

/// Ordered or unordered list item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// One typed entry of a document body, in body order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentElement {
    /// Body paragraph; the style name is kept but never rendered
    Paragraph { style: String, text: String },
    /// Heading with its numeric level
    Heading { level: usize, text: String },
    /// List item
    ListItem { kind: ListKind, text: String },
    /// Row-major cell text matrix
    Table { rows: Vec<Vec<String>> },
    /// Image, OLE object or legacy drawing resolved through a relationship
    Embedded { kind: String, path: PathBuf },
}

impl DocumentElement {
    /// Classify a non-empty paragraph by its style name.
    ///
    /// Styles mentioning "heading" become headings whose level is the trailing
    /// number of the style name (1 if there is none). Styles mentioning "list"
    /// or "bullet" become list items, unordered when "bullet" is present.
    pub fn from_styled_text(style: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        let lowered = style.to_lowercase();

        if lowered.contains("heading") {
            return Self::Heading {
                level: heading_level(&lowered),
                text,
            };
        }

        if lowered.contains("list") || lowered.contains("bullet") {
            let kind = if lowered.contains("bullet") {
                ListKind::Unordered
            } else {
                ListKind::Ordered
            };
            return Self::ListItem { kind, text };
        }

        Self::Paragraph {
            style: style.to_string(),
            text,
        }
    }
}

fn heading_level(style: &str) -> usize {
    let digits: String = style
        .trim_end()
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    match digits.parse::<usize>() {
        Ok(level) if level > 0 => level,
        _ => 1,
    }
}
