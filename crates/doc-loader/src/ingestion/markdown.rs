//! Markdown rendering of document elements and tabular data

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};

use crate::error::Result;
use crate::types::{DocumentElement, ListKind};

/// Renders element sequences one line (or block) per element
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    known_kinds: BTreeSet<String>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the embedded-object kinds, usually from a document's relationships
    pub fn with_kinds<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    pub fn known_kinds(&self) -> &BTreeSet<String> {
        &self.known_kinds
    }

    /// Render elements; embedded paths are made relative to `base_dir` when
    /// they lie beneath it
    pub fn render(&mut self, elements: &[DocumentElement], base_dir: Option<&Path>) -> String {
        let mut out = String::new();
        for element in elements {
            match element {
                DocumentElement::Heading { level, text } => {
                    out.push_str(&"#".repeat((*level).max(1)));
                    out.push(' ');
                    out.push_str(&single_line(text));
                    out.push('\n');
                }
                DocumentElement::ListItem { kind, text } => {
                    out.push_str(match kind {
                        ListKind::Unordered => "- ",
                        ListKind::Ordered => "1. ",
                    });
                    out.push_str(&single_line(text));
                    out.push('\n');
                }
                DocumentElement::Paragraph { text, .. } => {
                    out.push_str(text);
                    out.push('\n');
                }
                DocumentElement::Table { rows } => out.push_str(&render_table(rows)),
                DocumentElement::Embedded { kind, path } => {
                    if self.known_kinds.insert(kind.clone()) {
                        tracing::debug!("New embedded kind '{}'", kind);
                    }
                    out.push_str(&format!("![{}]({})\n", kind, link_target(path, base_dir)));
                }
            }
        }
        out
    }

    /// Render to `dest`, creating parent directories and overwriting any
    /// existing file
    pub fn write(&mut self, elements: &[DocumentElement], dest: &Path) -> Result<()> {
        let markdown = self.render(elements, dest.parent());
        write_markdown(dest, &markdown)
    }
}

/// Write markdown text, creating parent directories
pub fn write_markdown(dest: &Path, markdown: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, markdown)?;
    Ok(())
}

/// Markdown table with the first row as header. Rows are padded to the
/// widest row; an empty matrix renders nothing.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = (0..width)
            .map(|c| row.get(c).map(|cell| escape_cell(cell)).unwrap_or_default())
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            out.push_str(&format!("| {} |\n", vec!["---"; width].join(" | ")));
        }
    }
    out
}

fn escape_cell(cell: &str) -> String {
    single_line(&cell.replace('|', "\\|"))
}

fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn link_target(path: &Path, base_dir: Option<&Path>) -> String {
    let relative = base_dir
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);

    let mut target = String::new();
    for component in relative.components() {
        let part = match component {
            Component::RootDir => {
                target.push('/');
                continue;
            }
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy(),
            Component::CurDir => continue,
            Component::ParentDir => "..".into(),
            Component::Normal(name) => name.to_string_lossy(),
        };
        if !target.is_empty() && !target.ends_with('/') {
            target.push('/');
        }
        target.push_str(&part);
    }

    if target.chars().any(char::is_whitespace) {
        format!("<{}>", target)
    } else {
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_heading_paragraph_table() {
        let elements = vec![
            DocumentElement::from_styled_text("Heading 1", "Title"),
            DocumentElement::from_styled_text("Normal", "Hello world."),
            DocumentElement::Table {
                rows: vec![vec!["A".into()], vec!["B".into()]],
            },
        ];
        let markdown = MarkdownRenderer::new().render(&elements, None);
        assert_eq!(markdown, "# Title\nHello world.\n| A |\n| --- |\n| B |\n");
    }

    #[test]
    fn test_embedded_relative_to_destination() {
        let base = PathBuf::from("processed");
        let elements = vec![DocumentElement::Embedded {
            kind: "image".into(),
            path: base.join("media").join("img1.png"),
        }];
        let mut renderer = MarkdownRenderer::with_kinds(["image"]);
        assert_eq!(renderer.render(&elements, Some(&base)), "![image](media/img1.png)\n");
    }

    #[test]
    fn test_embedded_outside_destination_is_verbatim() {
        let elements = vec![DocumentElement::Embedded {
            kind: "oleObject".into(),
            path: PathBuf::from("elsewhere").join("ole.bin"),
        }];
        let mut renderer = MarkdownRenderer::new();
        assert_eq!(
            renderer.render(&elements, Some(Path::new("processed"))),
            "![oleObject](elsewhere/ole.bin)\n"
        );
        assert!(renderer.known_kinds().contains("oleObject"));
    }

    #[test]
    fn test_lists_and_levels() {
        let elements = vec![
            DocumentElement::from_styled_text("Heading 3", "Deep"),
            DocumentElement::from_styled_text("List Bullet", "dot"),
            DocumentElement::from_styled_text("List Number", "first"),
            DocumentElement::from_styled_text("List Number", "second"),
        ];
        assert_eq!(
            MarkdownRenderer::new().render(&elements, None),
            "### Deep\n- dot\n1. first\n1. second\n"
        );
    }

    #[test]
    fn test_table_cells_escaped_and_padded() {
        let rows = vec![
            vec!["a|b".to_string(), "two\nlines".to_string()],
            vec!["short".to_string()],
        ];
        assert_eq!(
            render_table(&rows),
            "| a\\|b | two lines |\n| --- | --- |\n| short |  |\n"
        );
        assert_eq!(render_table(&[]), "");
    }

    #[test]
    fn test_link_with_spaces_is_bracketed() {
        assert_eq!(
            link_target(&PathBuf::from("Q3 Report").join("media").join("a.png"), None),
            "<Q3 Report/media/a.png>"
        );
    }

    #[test]
    fn test_write_creates_parents() {
        let temp = tempfile::TempDir::new().unwrap();
        let dest = temp.path().join("nested").join("doc.md");
        let elements = vec![DocumentElement::from_styled_text("Normal", "x")];
        MarkdownRenderer::new().write(&elements, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "x\n");
    }
}
