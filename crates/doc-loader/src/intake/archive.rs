//! Recursive archive expansion

use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::ArchiveConfig;
use crate::error::{Error, Result};
use crate::types::{FileCategory, FileOutcome, FileRecord, WorkSet};

use super::classifier::classify;
use super::Disposer;

/// An archive waiting in the expansion queue
#[derive(Debug, Clone)]
struct QueuedArchive {
    record: FileRecord,
    /// 1 for archives found at intake
    depth: usize,
    /// Content hashes of the archives this one was unpacked from
    ancestors: Vec<String>,
}

impl QueuedArchive {
    fn top_level(record: FileRecord) -> Self {
        Self {
            record,
            depth: 1,
            ancestors: Vec::new(),
        }
    }
}

/// Drains archive buckets, unpacking each archive next to itself and feeding
/// the members back into the pipeline.
pub struct ArchiveExpander<'a> {
    config: &'a ArchiveConfig,
    disposer: &'a Disposer<'a>,
}

impl<'a> ArchiveExpander<'a> {
    pub fn new(config: &'a ArchiveConfig, disposer: &'a Disposer<'a>) -> Self {
        Self { config, disposer }
    }

    /// Expand every archive of `bucket`, FIFO.
    ///
    /// Nested archives are appended to the back of the same queue; every other
    /// member bucket is merged into `pending`. Returns one outcome per archive
    /// in the order they were drained.
    pub fn expand(
        &self,
        bucket: impl IntoIterator<Item = FileRecord>,
        pending: &mut WorkSet,
    ) -> Vec<FileOutcome> {
        let queue = bucket.into_iter().map(QueuedArchive::top_level).collect();
        self.drain(queue, pending)
    }

    fn drain(&self, mut queue: VecDeque<QueuedArchive>, pending: &mut WorkSet) -> Vec<FileOutcome> {
        let mut outcomes = Vec::new();
        while let Some(item) = queue.pop_front() {
            outcomes.push(self.expand_one(item, &mut queue, pending));
        }
        outcomes
    }

    fn expand_one(
        &self,
        item: QueuedArchive,
        queue: &mut VecDeque<QueuedArchive>,
        pending: &mut WorkSet,
    ) -> FileOutcome {
        let QueuedArchive {
            record,
            depth,
            mut ancestors,
        } = item;

        if depth > self.config.max_depth {
            tracing::warn!(
                "Skipping {}: nesting depth {} exceeds limit {}",
                record.path.display(),
                depth,
                self.config.max_depth
            );
            return FileOutcome::skipped(&record, format!("nesting depth {} exceeds limit", depth));
        }

        if self.config.detect_cycles {
            let hash = match hash_file(&record.path) {
                Ok(hash) => hash,
                Err(e) => {
                    tracing::error!("Cannot read archive {}: {}", record.path.display(), e);
                    return FileOutcome::failed(&record, "read", e.to_string());
                }
            };
            if ancestors.contains(&hash) {
                tracing::warn!(
                    "Skipping {}: identical to an enclosing archive",
                    record.path.display()
                );
                return FileOutcome::skipped(&record, "identical to an enclosing archive");
            }
            ancestors.push(hash);
        }

        let target = extraction_dir(&record);
        if let Err(e) = unpack(&record, &target) {
            tracing::error!("Failed to unpack {}: {}", record.path.display(), e);
            return FileOutcome::failed(&record, "unpack", e.to_string());
        }

        let mut scoped = match classify(&target) {
            Ok(scoped) => scoped,
            Err(e) => {
                tracing::error!("Failed to classify members of {}: {}", record.path.display(), e);
                return FileOutcome::failed(&record, "classify", e.to_string());
            }
        };

        // members left over from an earlier extraction may already be queued
        scoped.retain(|member| !pending.has_seen(&member.path));

        let nested = scoped.take_where(|ext| FileCategory::from_extension(ext).is_archive());
        for (_, bucket) in nested {
            for member in bucket {
                if !pending.mark_seen(member.path.clone()) {
                    continue;
                }
                tracing::debug!("Queued nested archive {}", member.path.display());
                queue.push_back(QueuedArchive {
                    record: member,
                    depth: depth + 1,
                    ancestors: ancestors.clone(),
                });
            }
        }

        tracing::info!(
            "Expanded {} into {} ({} members)",
            record.path.display(),
            target.display(),
            scoped.len()
        );
        pending.merge(scoped);

        let disposal = self.disposer.dispose(&record, FileCategory::Archive);
        FileOutcome::processed(&record, disposal)
    }
}

/// Sibling directory named after the archive without its extension
pub fn extraction_dir(record: &FileRecord) -> PathBuf {
    record.path.with_file_name(record.stem())
}

/// Unpack an archive into `dest`, format chosen by extension
fn unpack(record: &FileRecord, dest: &Path) -> Result<()> {
    match record.extension.as_str() {
        "zip" => {
            let file = File::open(&record.path)?;
            let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
            fs::create_dir_all(dest)?;
            archive.extract(dest)?;
            Ok(())
        }
        other => Err(Error::file_parse(
            record.file_name(),
            format!("unsupported archive format '{}'", other),
        )),
    }
}

fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
