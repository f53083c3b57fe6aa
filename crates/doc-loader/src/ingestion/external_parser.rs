//! PDF conversion through an external layout analyzer (pdftotext by default)

use std::process::{Command, Stdio};

use crate::config::PdfConfig;
use crate::error::{Error, Result};
use crate::types::FileRecord;

use super::handler::{Conversion, FileHandler, HandlerContext};
use super::markdown::write_markdown;

/// Runs the configured analyzer and writes its text output as markdown
pub struct PdfHandler {
    config: PdfConfig,
}

impl PdfHandler {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Check if the configured analyzer can be spawned at all
    pub fn is_available(&self) -> bool {
        self.config.enabled
            && Command::new(&self.config.command)
                .arg("-v")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok()
    }

    fn extract_text(&self, record: &FileRecord) -> Result<String> {
        let output = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(&record.path)
            .arg("-")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::external_tool(self.config.command.as_str(), format!("failed to spawn: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::external_tool(
                self.config.command.as_str(),
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let text = cleanup_pdf_text(&String::from_utf8_lossy(&output.stdout));
        if text.trim().is_empty() {
            return Err(Error::file_parse(
                record.file_name(),
                "analyzer produced no text - PDF may be image-based",
            ));
        }
        Ok(text)
    }
}

impl FileHandler for PdfHandler {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        if !self.config.enabled {
            return Ok(Conversion::Skipped("pdf analyzer disabled".to_string()));
        }
        let text = self.extract_text(record)?;
        write_markdown(&ctx.markdown_path(record), &text)?;
        Ok(Conversion::Converted)
    }
}

/// Normalize analyzer output: typographic punctuation to ASCII, form feeds
/// (page breaks) to blank lines, trailing whitespace trimmed per line
fn cleanup_pdf_text(text: &str) -> String {
    let replaced = text
        .replace('\u{2010}', "-")
        .replace('\u{2011}', "-")
        .replace('\u{2013}', "-")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"")
        .replace('\u{00A0}', " ")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{000C}', "\n");

    let mut out = String::with_capacity(replaced.len());
    for line in replaced.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
