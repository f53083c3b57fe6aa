//! Access to the parts of a docx package

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use super::xml::{self, XmlElement};
use crate::error::{Error, Result};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT: &str = "officeDocument";
/// Upper bound on the buffer reserved from a part's declared size
const MAX_PREALLOCATION: u64 = 1 << 20;

/// One relationship of a part, with its target resolved to a part name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRelationship {
    pub id: String,
    /// Last segment of the relationship type URI (`image`, `oleObject`, ...)
    pub kind: String,
    /// Part name for internal targets, raw target for external ones
    pub target: String,
    pub external: bool,
}

/// An opened docx zip container
pub struct DocxPackage {
    name: String,
    archive: ZipArchive<BufReader<File>>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| Error::file_parse(name.as_str(), format!("not a zip package: {}", e)))?;
        Ok(Self { name, archive })
    }

    /// File name of the package, used in error messages
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_part(&self, part: &str) -> bool {
        self.archive.index_for_name(part).is_some()
    }

    pub fn read_part(&mut self, part: &str) -> Result<Vec<u8>> {
        let mut entry = match self.archive.by_name(part) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(Error::file_parse(self.name.as_str(), format!("missing part '{}'", part)))
            }
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::with_capacity(preallocation(entry.size()));
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn read_xml(&mut self, part: &str) -> Result<XmlElement> {
        let data = self.read_part(part)?;
        let text = String::from_utf8_lossy(&data);
        xml::parse(text.trim_start_matches('\u{feff}'))
            .map_err(|e| Error::file_parse(self.name.as_str(), format!("{}: {}", part, e)))
    }

    /// Name of the main document part, found through the package relationships
    pub fn main_part(&mut self) -> Result<String> {
        if self.has_part(PACKAGE_RELS) {
            let rels = self.relationships_at(PACKAGE_RELS, "")?;
            if let Some(rel) = rels.into_iter().find(|r| r.kind == OFFICE_DOCUMENT && !r.external) {
                return Ok(rel.target);
            }
        }
        if self.has_part(DEFAULT_MAIN_PART) {
            return Ok(DEFAULT_MAIN_PART.to_string());
        }
        Err(Error::file_parse(self.name.as_str(), "no main document part"))
    }

    /// Relationships declared by `part`; empty when it has no rels part
    pub fn relationships(&mut self, part: &str) -> Result<Vec<PartRelationship>> {
        let rels_part = rels_part_for(part);
        if !self.has_part(&rels_part) {
            return Ok(Vec::new());
        }
        self.relationships_at(&rels_part, part_dir(part))
    }

    fn relationships_at(&mut self, rels_part: &str, base_dir: &str) -> Result<Vec<PartRelationship>> {
        let root = self.read_xml(rels_part)?;
        let mut rels = Vec::new();
        for el in root.elements_named("Relationship") {
            let (Some(id), Some(kind), Some(target)) = (el.attr("Id"), el.attr("Type"), el.attr("Target")) else {
                tracing::debug!("Skipping incomplete relationship in {}:{}", self.name, rels_part);
                continue;
            };
            let external = el.attr("TargetMode").is_some_and(|m| m.eq_ignore_ascii_case("External"));
            let target = if external {
                target.to_string()
            } else {
                resolve_target(base_dir, target)
            };
            rels.push(PartRelationship {
                id: id.to_string(),
                kind: kind.rsplit('/').next().unwrap_or(kind).to_string(),
                target,
                external,
            });
        }
        Ok(rels)
    }
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`
/// Declared sizes come from the archive and are not trusted
fn preallocation(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Folder of a part name, empty at the package root
pub fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the folder of its source part.
/// `..` never climbs above the package root.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    let (start, target) = match target.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (base_dir, target),
    };

    let mut segments: Vec<&str> = start.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Paragraph style names keyed by style id
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

/// Built-in styles Word stores under a lower-case name
const BUILTIN_STYLE_NAMES: &[(&str, &str)] = &[
    ("normal", "Normal"),
    ("title", "Title"),
    ("subtitle", "Subtitle"),
    ("caption", "Caption"),
    ("header", "Header"),
    ("footer", "Footer"),
    ("toc heading", "TOC Heading"),
    ("heading 1", "Heading 1"),
    ("heading 2", "Heading 2"),
    ("heading 3", "Heading 3"),
    ("heading 4", "Heading 4"),
    ("heading 5", "Heading 5"),
    ("heading 6", "Heading 6"),
    ("heading 7", "Heading 7"),
    ("heading 8", "Heading 8"),
    ("heading 9", "Heading 9"),
];

fn ui_style_name(name: &str) -> String {
    BUILTIN_STYLE_NAMES
        .iter()
        .find(|(raw, _)| *raw == name)
        .map(|(_, ui)| ui.to_string())
        .unwrap_or_else(|| name.to_string())
}

impl StyleSheet {
    pub fn from_xml(root: &XmlElement) -> Self {
        let mut sheet = Self::default();
        for style in root.elements_named("w:style") {
            if style.attr("w:type").unwrap_or("paragraph") != "paragraph" {
                continue;
            }
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style
                .child("w:name")
                .and_then(|n| n.attr("w:val"))
                .map(ui_style_name)
                .unwrap_or_else(|| id.to_string());
            if matches!(style.attr("w:default"), Some("1") | Some("true")) {
                sheet.default_paragraph = Some(name.clone());
            }
            sheet.names.insert(id.to_string(), name);
        }
        sheet
    }

    /// Name for a paragraph's style id; paragraphs without one use the default
    pub fn paragraph_style(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self.default_paragraph.clone().unwrap_or_else(|| "Normal".to_string()),
        }
    }
}
