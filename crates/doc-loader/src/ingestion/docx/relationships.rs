//! Extraction of relationship targets ahead of body traversal

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::package::{DocxPackage, PartRelationship};
use crate::error::Result;

/// Where a relationship's target was written and what kind it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelationship {
    pub path: PathBuf,
    pub kind: String,
}

/// Relationship id -> extracted target, for one document
#[derive(Debug, Clone, Default)]
pub struct RelationshipMap {
    entries: BTreeMap<String, ResolvedRelationship>,
}

impl RelationshipMap {
    pub fn insert(&mut self, id: impl Into<String>, resolved: ResolvedRelationship) {
        self.entries.insert(id.into(), resolved);
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedRelationship> {
        self.entries.get(id)
    }

    /// Distinct relationship kinds present in the map
    pub fn kinds(&self) -> BTreeSet<String> {
        self.entries.values().map(|r| r.kind.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write every internal relationship target of the main part under
/// `media_dir` and record where each one landed.
///
/// Targets keep their path relative to the main part's folder, so
/// `word/media/image1.png` becomes `<media_dir>/media/image1.png`. External
/// targets (hyperlinks) are skipped.
pub fn extract_relationships(
    package: &mut DocxPackage,
    rels: &[PartRelationship],
    main_dir: &str,
    media_dir: &Path,
) -> Result<RelationshipMap> {
    let mut map = RelationshipMap::default();

    for rel in rels.iter().filter(|r| !r.external) {
        let data = package.read_part(&rel.target)?;
        let dest = media_dir.join(relative_part_path(&rel.target, main_dir));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, data)?;

        tracing::debug!("Extracted {} ({}) to {}", rel.id, rel.kind, dest.display());
        map.insert(
            rel.id.clone(),
            ResolvedRelationship {
                path: dest,
                kind: rel.kind.clone(),
            },
        );
    }

    Ok(map)
}

/// Part name relative to `main_dir` when it lives below it, else the full name
fn relative_part_path(part: &str, main_dir: &str) -> PathBuf {
    let relative = if main_dir.is_empty() {
        part
    } else {
        part.strip_prefix(main_dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(part)
    };
    relative.split('/').filter(|s| !s.is_empty()).collect()
}
