//! Extension-keyed FIFO buckets of discovered files

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use super::FileRecord;

/// Files grouped by lower-cased extension.
///
/// Each bucket is a FIFO queue in discovery order. Keys iterate in
/// lexicographic order so runs over the same tree are reproducible.
///
/// A path is accepted at most once over the lifetime of the set, even after
/// its bucket has been taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkSet {
    buckets: BTreeMap<String, VecDeque<FileRecord>>,
    seen: HashSet<PathBuf>,
}

impl WorkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the back of its extension bucket.
    ///
    /// Returns `false` and drops the record when its path was seen before.
    pub fn push(&mut self, record: FileRecord) -> bool {
        if !self.mark_seen(record.path.clone()) {
            tracing::debug!("Ignoring duplicate {}", record.path.display());
            return false;
        }
        self.buckets
            .entry(record.extension.clone())
            .or_default()
            .push_back(record);
        true
    }

    /// Merge another set into this one.
    ///
    /// For an extension present on both sides the incoming records are
    /// appended after the existing ones; otherwise the incoming bucket is
    /// taken as-is. Paths already seen here are dropped.
    pub fn merge(&mut self, other: WorkSet) {
        for (_, incoming) in other.buckets {
            for record in incoming {
                self.push(record);
            }
        }
    }

    /// Record a path as handled without queueing it. Returns `false` if it
    /// was already known.
    pub fn mark_seen(&mut self, path: PathBuf) -> bool {
        self.seen.insert(path)
    }

    pub fn has_seen(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    /// Keep only the records matching the predicate; empty buckets are removed
    pub fn retain(&mut self, mut pred: impl FnMut(&FileRecord) -> bool) {
        for bucket in self.buckets.values_mut() {
            bucket.retain(|r| pred(r));
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Remove and return a whole bucket
    pub fn take(&mut self, extension: &str) -> Option<VecDeque<FileRecord>> {
        self.buckets.remove(extension)
    }

    /// Remove every bucket matching the predicate, in key order
    pub fn take_where(&mut self, mut pred: impl FnMut(&str) -> bool) -> Vec<(String, VecDeque<FileRecord>)> {
        let keys: Vec<String> = self.buckets.keys().filter(|k| pred(k)).cloned().collect();
        keys.into_iter()
            .filter_map(|k| self.buckets.remove(&k).map(|bucket| (k, bucket)))
            .collect()
    }

    /// Remove the first non-empty bucket in key order
    pub fn pop_bucket(&mut self) -> Option<(String, VecDeque<FileRecord>)> {
        self.buckets.pop_first()
    }

    pub fn get(&self, extension: &str) -> Option<&VecDeque<FileRecord>> {
        self.buckets.get(extension)
    }

    pub fn contains_key(&self, extension: &str) -> bool {
        self.buckets.contains_key(extension)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VecDeque<FileRecord>)> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of records across all buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(VecDeque::is_empty)
    }
}

impl FromIterator<FileRecord> for WorkSet {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut set = WorkSet::new();
        for record in iter {
            set.push(record);
        }
        set
    }
}
