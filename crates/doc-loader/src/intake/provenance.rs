//! Snapshot of the intake work set taken before any expansion

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::types::{FileRecord, WorkSet};

/// Files present at intake, keyed by extension.
///
/// Built once from the initial walk and never mutated afterwards. Anything not
/// in here was produced by unpacking an archive.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    originals: BTreeMap<String, HashSet<PathBuf>>,
}

impl Provenance {
    pub fn snapshot(set: &WorkSet) -> Self {
        let originals = set
            .iter()
            .map(|(ext, bucket)| {
                let paths = bucket.iter().map(|r| r.path.clone()).collect();
                (ext.to_string(), paths)
            })
            .collect();
        Self { originals }
    }

    /// Whether `path` was present at intake in the `extension` bucket
    pub fn contains(&self, extension: &str, path: &Path) -> bool {
        self.originals
            .get(extension)
            .is_some_and(|paths| paths.contains(path))
    }

    /// Whether the record was supplied by the caller rather than derived
    pub fn is_original(&self, record: &FileRecord) -> bool {
        self.contains(&record.extension, &record.path)
    }

    pub fn len(&self) -> usize {
        self.originals.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
