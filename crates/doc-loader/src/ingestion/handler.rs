//! Per-extension handler trait and the category dispatch table

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::intake::Disposer;
use crate::layout::DataLayout;
use crate::types::{FileCategory, FileOutcome, FileRecord};

use super::docx::DocxHandler;
use super::external_parser::PdfHandler;
use super::parser::{CsvHandler, ImageHandler, JsonHandler, OtherHandler, SpreadsheetHandler, TextHandler};

/// Result of converting a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Output written; the input is disposed of
    Converted,
    /// Deliberately not converted; the input stays where it is
    Skipped(String),
}

/// What a handler needs from the running pipeline.
///
/// One context lives for one dispatch pass and remembers every output name it
/// has handed out, so two inputs sharing a stem never write the same file.
pub struct HandlerContext<'a> {
    pub layout: &'a DataLayout,
    pub disposer: &'a Disposer<'a>,
    claimed: RefCell<HashSet<String>>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(layout: &'a DataLayout, disposer: &'a Disposer<'a>) -> Self {
        Self {
            layout,
            disposer,
            claimed: RefCell::new(HashSet::new()),
        }
    }

    /// `<processed>/<stem>.<extension>`, or `<stem>-2.<extension>`,
    /// `<stem>-3.<extension>`, ... when that name was already handed out
    pub fn output_path(&self, stem: &str, extension: &str) -> PathBuf {
        let mut claimed = self.claimed.borrow_mut();
        let mut name = format!("{}.{}", stem, extension);
        let mut n = 1;
        while !claimed.insert(name.to_lowercase()) {
            n += 1;
            name = format!("{}-{}.{}", stem, n, extension);
        }
        if n > 1 {
            tracing::warn!("Output {}.{} already written this run; using {}", stem, extension, name);
        }
        self.layout.processed_dir().join(name)
    }

    /// Markdown destination for a record
    pub fn markdown_path(&self, record: &FileRecord) -> PathBuf {
        self.output_path(&record.stem(), "md")
    }
}

/// Converts every file of one extension bucket
pub trait FileHandler {
    /// Short name used in logs and failure outcomes
    fn name(&self) -> &'static str;

    /// Convert one file. Disposal is left to [`FileHandler::handle`].
    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion>;

    /// Convert a bucket file by file. A failure is logged and recorded for
    /// that file only; the file is left in place and the loop continues.
    fn handle(
        &self,
        category: FileCategory,
        files: VecDeque<FileRecord>,
        ctx: &HandlerContext<'_>,
    ) -> Vec<FileOutcome> {
        files
            .into_iter()
            .map(|record| match self.convert(&record, ctx) {
                Ok(Conversion::Converted) => {
                    let disposal = ctx.disposer.dispose(&record, category);
                    FileOutcome::processed(&record, disposal)
                }
                Ok(Conversion::Skipped(reason)) => {
                    tracing::info!("Skipping {}: {}", record.path.display(), reason);
                    FileOutcome::skipped(&record, reason)
                }
                Err(e) => {
                    tracing::error!("{} handler failed on {}: {}", self.name(), record.path.display(), e);
                    FileOutcome::failed(&record, self.name(), e.to_string())
                }
            })
            .collect()
    }
}

/// Where a bucket goes after classification
pub enum Route<'h> {
    /// Archive buckets feed the expansion loop
    Expand,
    Convert(&'h dyn FileHandler),
}

/// One handler per category
pub struct HandlerSet {
    pub pdf: Box<dyn FileHandler>,
    pub csv: Box<dyn FileHandler>,
    pub json: Box<dyn FileHandler>,
    pub spreadsheet: Box<dyn FileHandler>,
    pub word_document: Box<dyn FileHandler>,
    pub image: Box<dyn FileHandler>,
    pub text: Box<dyn FileHandler>,
    pub other: Box<dyn FileHandler>,
}

impl HandlerSet {
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            pdf: Box::new(PdfHandler::new(config.pdf.clone())),
            csv: Box::new(CsvHandler),
            json: Box::new(JsonHandler),
            spreadsheet: Box::new(SpreadsheetHandler),
            word_document: Box::new(DocxHandler),
            image: Box::new(ImageHandler),
            text: Box::new(TextHandler),
            other: Box::new(OtherHandler),
        }
    }

    pub fn route(&self, category: FileCategory) -> Route<'_> {
        match category {
            FileCategory::Archive => Route::Expand,
            FileCategory::Pdf => Route::Convert(self.pdf.as_ref()),
            FileCategory::Csv => Route::Convert(self.csv.as_ref()),
            FileCategory::Json => Route::Convert(self.json.as_ref()),
            FileCategory::Spreadsheet => Route::Convert(self.spreadsheet.as_ref()),
            FileCategory::WordDocument => Route::Convert(self.word_document.as_ref()),
            FileCategory::ImagePng | FileCategory::ImageJpg => Route::Convert(self.image.as_ref()),
            FileCategory::Text => Route::Convert(self.text.as_ref()),
            FileCategory::Other => Route::Convert(self.other.as_ref()),
        }
    }
}
