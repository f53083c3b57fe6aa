//! Word document (.docx) extraction and conversion
//!
//! Conversion runs in three steps:
//! 1. every internal relationship target of the main part is written under
//!    `<processed>/<name>/` and indexed in a [`RelationshipMap`]
//! 2. the body is walked in document order into [`DocumentElement`]s
//! 3. the elements are rendered to `<processed>/<name>.md`
//!
//! [`DocumentElement`]: crate::types::DocumentElement

mod extractor;
mod package;
mod relationships;
pub mod xml;

pub use extractor::{extract_document, DocumentContext, ExtractedDocument};
pub use package::{DocxPackage, PartRelationship, StyleSheet};
pub use relationships::{extract_relationships, RelationshipMap, ResolvedRelationship};

use crate::error::Result;
use crate::types::FileRecord;

use super::handler::{Conversion, FileHandler, HandlerContext};
use super::markdown::MarkdownRenderer;

/// Converts `.docx` files to markdown plus a media folder
pub struct DocxHandler;

impl FileHandler for DocxHandler {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn convert(&self, record: &FileRecord, ctx: &HandlerContext<'_>) -> Result<Conversion> {
        let doc_ctx = DocumentContext::new(record, ctx.markdown_path(record));
        let extracted = extract_document(&doc_ctx)?;

        let mut renderer = MarkdownRenderer::with_kinds(extracted.relationships.kinds());
        renderer.write(&extracted.elements, &doc_ctx.markdown_path)?;

        tracing::info!(
            "Converted {} ({} elements) to {}",
            record.path.display(),
            extracted.elements.len(),
            doc_ctx.markdown_path.display()
        );
        Ok(Conversion::Converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataDirsConfig;
    use crate::intake::{Disposer, Provenance};
    use crate::layout::DataLayout;
    use crate::test_support::{docx_bytes, drawing_para, para, section_properties, table, IMAGE_REL};
    use crate::types::{Disposal, FileCategory, OutcomeStatus, WorkSet};
    use std::collections::VecDeque;
    use tempfile::TempDir;

    #[test]
    fn test_docx_to_markdown() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(&DataDirsConfig::under(temp.path()));
        layout.ensure().unwrap();

        let body = [
            para(Some("Heading1"), "Title"),
            para(None, "Hello world."),
            table(&[&["A"], &["B"]]),
            para(None, ""),
            drawing_para("rId5"),
            section_properties(),
        ]
        .concat();
        let path = layout.raw_dir().join("memo.docx");
        std::fs::write(
            &path,
            docx_bytes(&body, &[("rId5", IMAGE_REL, "media/img1.png")], &[("word/media/img1.png", b"png")]),
        )
        .unwrap();

        let record = FileRecord::new(&path);
        let set: WorkSet = [record.clone()].into_iter().collect();
        let provenance = Provenance::snapshot(&set);
        let disposer = Disposer::new(&layout, &provenance);
        let ctx = HandlerContext::new(&layout, &disposer);

        let outcomes = DocxHandler.handle(FileCategory::WordDocument, VecDeque::from([record]), &ctx);

        assert!(matches!(
            &outcomes[0].status,
            OutcomeStatus::Processed { disposal: Disposal::Moved(dest) } if dest.ends_with("docx/memo.docx")
        ));
        let markdown = std::fs::read_to_string(layout.processed_dir().join("memo.md")).unwrap();
        assert_eq!(
            markdown,
            "# Title\nHello world.\n| A |\n| --- |\n| B |\n![image](memo/media/img1.png)\n"
        );
        assert!(layout.processed_dir().join("memo").join("media").join("img1.png").exists());
    }

    #[test]
    fn test_broken_docx_left_in_place() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(&DataDirsConfig::under(temp.path()));
        layout.ensure().unwrap();
        let path = layout.raw_dir().join("broken.docx");
        std::fs::write(&path, docx_bytes(&drawing_para("rIdMissing"), &[], &[])).unwrap();

        let provenance = Provenance::default();
        let disposer = Disposer::new(&layout, &provenance);
        let ctx = HandlerContext::new(&layout, &disposer);
        let outcomes = DocxHandler.handle(FileCategory::WordDocument, VecDeque::from([FileRecord::new(&path)]), &ctx);

        assert!(matches!(&outcomes[0].status, OutcomeStatus::Failed { stage, .. } if stage == "docx"));
        assert!(path.exists());
    }
}
