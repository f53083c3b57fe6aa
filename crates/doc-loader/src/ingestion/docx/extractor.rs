//! Body traversal: turns the main document part into [`DocumentElement`]s

use std::path::PathBuf;

use super::package::{part_dir, DocxPackage, StyleSheet};
use super::relationships::{extract_relationships, RelationshipMap};
use super::xml::{XmlElement, XmlNode};
use crate::error::{Error, Result};
use crate::types::{DocumentElement, FileRecord};

/// Per-document naming, threaded through extraction and rendering
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub source: PathBuf,
    /// Base name of the document, also the name of its media folder
    pub name: String,
    pub media_dir: PathBuf,
    pub markdown_path: PathBuf,
}

impl DocumentContext {
    /// The media folder sits next to the markdown file and shares its name
    pub fn new(record: &FileRecord, markdown_path: PathBuf) -> Self {
        let name = markdown_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.stem());
        Self {
            source: record.path.clone(),
            media_dir: markdown_path.with_file_name(&name),
            markdown_path,
            name,
        }
    }
}

#[derive(Debug)]
pub struct ExtractedDocument {
    pub elements: Vec<DocumentElement>,
    pub relationships: RelationshipMap,
}

/// Open the package, extract relationship targets, then walk the body
pub fn extract_document(ctx: &DocumentContext) -> Result<ExtractedDocument> {
    let mut package = DocxPackage::open(&ctx.source)?;
    let main_part = package.main_part()?;
    let rels = package.relationships(&main_part)?;

    let relationships = extract_relationships(&mut package, &rels, part_dir(&main_part), &ctx.media_dir)?;

    let styles = match rels.iter().find(|r| r.kind == "styles" && !r.external) {
        Some(rel) => StyleSheet::from_xml(&package.read_xml(&rel.target)?),
        None => StyleSheet::default(),
    };

    let document = package.read_xml(&main_part)?;
    let body = document
        .child("w:body")
        .ok_or_else(|| Error::file_parse(package.name(), "main part has no body"))?;

    let elements = BodyView::new(body, &styles).into_elements(&relationships, package.name())?;
    tracing::debug!(
        "Extracted {} elements and {} relationships from {}",
        elements.len(),
        relationships.len(),
        ctx.source.display()
    );

    Ok(ExtractedDocument {
        elements,
        relationships,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Table,
    Other,
}

#[derive(Debug)]
struct ParagraphBlock {
    style: String,
    text: String,
    embedded: Option<String>,
}

#[derive(Debug)]
struct TableBlock {
    rows: Vec<Vec<String>>,
}

/// Flat order of the body's children plus typed paragraph and table
/// collections. Consumers walk the order and advance one cursor per kind.
#[derive(Debug)]
struct BodyView {
    order: Vec<BlockKind>,
    paragraphs: Vec<ParagraphBlock>,
    tables: Vec<TableBlock>,
}

impl BodyView {
    fn new(body: &XmlElement, styles: &StyleSheet) -> Self {
        let mut view = Self {
            order: Vec::new(),
            paragraphs: Vec::new(),
            tables: Vec::new(),
        };
        for child in body.elements() {
            match child.name.as_str() {
                "w:p" => {
                    view.order.push(BlockKind::Paragraph);
                    view.paragraphs.push(ParagraphBlock::from_xml(child, styles));
                }
                "w:tbl" => {
                    view.order.push(BlockKind::Table);
                    view.tables.push(TableBlock::from_xml(child));
                }
                _ => view.order.push(BlockKind::Other),
            }
        }
        view
    }

    fn into_elements(self, relationships: &RelationshipMap, source: &str) -> Result<Vec<DocumentElement>> {
        let mut paragraphs = self.paragraphs.into_iter();
        let mut tables = self.tables.into_iter();
        let mut elements = Vec::new();

        for kind in self.order {
            match kind {
                BlockKind::Paragraph => {
                    let paragraph = paragraphs
                        .next()
                        .ok_or_else(|| Error::internal("paragraph cursor ran past the body"))?;
                    if let Some(element) = paragraph.into_element(relationships, source)? {
                        elements.push(element);
                    }
                }
                BlockKind::Table => {
                    let table = tables
                        .next()
                        .ok_or_else(|| Error::internal("table cursor ran past the body"))?;
                    elements.push(DocumentElement::Table { rows: table.rows });
                }
                BlockKind::Other => {}
            }
        }

        Ok(elements)
    }
}

impl ParagraphBlock {
    fn from_xml(p: &XmlElement, styles: &StyleSheet) -> Self {
        let style_id = p
            .child("w:pPr")
            .and_then(|ppr| ppr.child("w:pStyle"))
            .and_then(|s| s.attr("w:val"));
        Self {
            style: styles.paragraph_style(style_id),
            text: paragraph_text(p),
            embedded: embedded_reference(p),
        }
    }

    /// Text wins over an embedded object; a paragraph with neither is dropped
    fn into_element(self, relationships: &RelationshipMap, source: &str) -> Result<Option<DocumentElement>> {
        if !self.text.trim().is_empty() {
            return Ok(Some(DocumentElement::from_styled_text(&self.style, self.text)));
        }
        let Some(id) = self.embedded else {
            return Ok(None);
        };
        let resolved = relationships
            .get(&id)
            .ok_or_else(|| Error::missing_relationship(source, id.as_str()))?;
        Ok(Some(DocumentElement::Embedded {
            kind: resolved.kind.clone(),
            path: resolved.path.clone(),
        }))
    }
}

impl TableBlock {
    fn from_xml(tbl: &XmlElement) -> Self {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for tr in tbl.elements_named("w:tr") {
            let mut row = Vec::new();
            for tc in tr.elements_named("w:tc") {
                let props = tc.child("w:tcPr");
                let span = props
                    .and_then(|p| p.child("w:gridSpan"))
                    .and_then(|g| g.attr("w:val"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(1);
                let continues_merge = props
                    .and_then(|p| p.child("w:vMerge"))
                    .is_some_and(|m| m.attr("w:val") != Some("restart"));

                let text = if continues_merge {
                    rows.last()
                        .and_then(|above| above.get(row.len()))
                        .cloned()
                        .unwrap_or_default()
                } else {
                    cell_text(tc)
                };
                row.extend(std::iter::repeat(text).take(span));
            }
            rows.push(row);
        }

        Self { rows }
    }
}

fn cell_text(tc: &XmlElement) -> String {
    tc.elements_named("w:p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run text of a paragraph, hyperlinks included, text boxes excluded
fn paragraph_text(p: &XmlElement) -> String {
    let mut text = String::new();
    collect_text(p, &mut text);
    text
}

fn collect_text(el: &XmlElement, out: &mut String) {
    for node in &el.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            "w:pPr" | "w:rPr" | "w:txbxContent" => {}
            _ => collect_text(child, out),
        }
    }
}

/// Relationship id of the first embedded object: drawing image, then OLE
/// object, then legacy VML image data
fn embedded_reference(p: &XmlElement) -> Option<String> {
    const REFERENCES: [(&str, &str); 3] = [
        ("a:blip", "r:embed"),
        ("o:OLEObject", "r:id"),
        ("v:imagedata", "r:id"),
    ];
    REFERENCES
        .iter()
        .find_map(|(element, attr)| p.find(element).and_then(|e| e.attr(attr)))
        .map(str::to_string)
}
