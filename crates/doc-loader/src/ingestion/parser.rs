//! Built-in converters for text, tabular, image and unrecognized files

use std::fs;

use crate::error::{Error, Result};
use crate::types::FileRecord;

use super::handler::{Conversion, FileHandler, HandlerContext};
use super::markdown::{render_table, write_markdown};

/// Plain text and markdown, copied verbatim to `<stem>.md`
pub struct TextHandler;

impl FileHandler for TextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        let data = fs::read(&record.path)?;
        let content = String::from_utf8_lossy(&data);
        write_markdown(&ctx.markdown_path(record), &content)?;
        Ok(Conversion::Converted)
    }
}

/// CSV rendered as a markdown table, first record as header
pub struct CsvHandler;

impl FileHandler for CsvHandler {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&record.path)?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            rows.push(row.iter().map(str::to_string).collect::<Vec<_>>());
        }

        write_markdown(&ctx.markdown_path(record), &render_table(&rows))?;
        Ok(Conversion::Converted)
    }
}

/// JSON pretty-printed inside a fenced block
pub struct JsonHandler;

impl FileHandler for JsonHandler {
    fn name(&self) -> &'static str {
        "json"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        let data = fs::read(&record.path)?;
        let value: serde_json::Value = serde_json::from_slice(&data)?;
        let pretty = serde_json::to_string_pretty(&value)?;
        write_markdown(&ctx.markdown_path(record), &format!("```json\n{}\n```\n", pretty))?;
        Ok(Conversion::Converted)
    }
}

/// Workbooks: one `## <sheet>` section with a table per non-empty sheet
pub struct SpreadsheetHandler;

impl FileHandler for SpreadsheetHandler {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        use calamine::Reader;

        let mut workbook = calamine::open_workbook_auto(&record.path)?;
        let mut content = String::new();

        for sheet_name in workbook.sheet_names().to_vec() {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("Skipping sheet '{}' of {}: {}", sheet_name, record.path.display(), e);
                    continue;
                }
            };

            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
                .filter(|row| !row.iter().all(String::is_empty))
                .collect();
            if rows.is_empty() {
                continue;
            }

            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(&format!("## {}\n", sheet_name));
            content.push_str(&render_table(&rows));
        }

        write_markdown(&ctx.markdown_path(record), &content)?;
        Ok(Conversion::Converted)
    }
}

fn cell_text(cell: &calamine::Data) -> String {
    match cell {
        calamine::Data::Empty => String::new(),
        calamine::Data::String(s) => s.clone(),
        calamine::Data::Float(f) => f.to_string(),
        calamine::Data::Int(i) => i.to_string(),
        calamine::Data::Bool(b) => b.to_string(),
        calamine::Data::DateTime(dt) => dt.to_string(),
        calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => s.clone(),
        calamine::Data::Error(e) => e.to_string(),
    }
}

/// PNG and JPEG files, copied into the processed directory unchanged
pub struct ImageHandler;

impl FileHandler for ImageHandler {
    fn name(&self) -> &'static str {
        "image"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        let extension = record.path.extension().ok_or_else(|| {
            Error::file_parse(record.path.display().to_string(), "image has no extension")
        })?;
        let dest = ctx.output_path(&record.stem(), &extension.to_string_lossy());
        fs::create_dir_all(ctx.layout.processed_dir())?;
        fs::copy(&record.path, &dest)?;
        Ok(Conversion::Converted)
    }
}

/// Extensions without a converter; the file is only disposed of
pub struct OtherHandler;

impl FileHandler for OtherHandler {
    fn name(&self) -> &'static str {
        "other"
    }

    fn convert(&self, record: &FileRecord, _ctx: &HandlerContext<'_>) -> Result<Conversion> {
        tracing::debug!("No converter for {}", record.path.display());
        Ok(Conversion::Converted)
    }
}
