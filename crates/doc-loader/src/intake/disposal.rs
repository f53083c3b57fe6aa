//! Move-or-delete policy for files once they have been processed

use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::DataLayout;
use crate::types::{Disposal, FileCategory, FileRecord};

use super::Provenance;

/// Applies the provenance rule: originals are moved under the originals root,
/// derived files are deleted. Filesystem errors never propagate; they are
/// logged and reported as [`Disposal::Retained`].
pub struct Disposer<'a> {
    layout: &'a DataLayout,
    provenance: &'a Provenance,
}

impl<'a> Disposer<'a> {
    pub fn new(layout: &'a DataLayout, provenance: &'a Provenance) -> Self {
        Self { layout, provenance }
    }

    pub fn dispose(&self, record: &FileRecord, category: FileCategory) -> Disposal {
        let result = if self.provenance.is_original(record) {
            let dest = self.destination(record, category);
            move_file(&record.path, &dest).map(|()| Disposal::Moved(dest))
        } else {
            fs::remove_file(&record.path).map(|()| Disposal::Deleted)
        };

        match result {
            Ok(disposal) => {
                tracing::debug!("Disposed {}: {:?}", record.path.display(), disposal);
                disposal
            }
            Err(e) => {
                tracing::warn!("Could not dispose of {}: {}", record.path.display(), e);
                Disposal::Retained(e.to_string())
            }
        }
    }

    /// Category subdir plus the file's path below the raw root. An occupied
    /// destination gets a numeric suffix so earlier originals are never
    /// replaced.
    fn destination(&self, record: &FileRecord, category: FileCategory) -> PathBuf {
        let relative = record
            .path
            .strip_prefix(self.layout.raw_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| PathBuf::from(record.file_name()));
        let dest = self.layout.originals_for(category).join(relative);
        if !dest.exists() {
            return dest;
        }

        let stem = record.stem();
        let extension = record.path.extension().map(|e| e.to_string_lossy().into_owned());
        (1..)
            .map(|n| {
                let name = match &extension {
                    Some(ext) => format!("{}-{}.{}", stem, n, ext),
                    None => format!("{}-{}", stem, n),
                };
                dest.with_file_name(name)
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(dest)
    }
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataDirsConfig;
    use crate::types::WorkSet;
    use tempfile::TempDir;

    fn originals_destination(layout: &DataLayout, record: &FileRecord) -> std::path::PathBuf {
        layout.originals_for(record.category()).join(record.file_name())
    }

    fn setup() -> (TempDir, DataLayout) {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(&DataDirsConfig::under(temp.path()));
        layout.ensure().unwrap();
        (temp, layout)
    }

    #[test]
    fn test_original_is_moved() {
        let (_temp, layout) = setup();
        let path = layout.raw_dir().join("input.zip");
        fs::write(&path, b"zip").unwrap();
        let record = FileRecord::new(&path);
        let provenance = Provenance::snapshot(&[record.clone()].into_iter().collect::<WorkSet>());

        let disposal = Disposer::new(&layout, &provenance).dispose(&record, FileCategory::Archive);

        let dest = originals_destination(&layout, &record);
        assert_eq!(disposal, Disposal::Moved(dest.clone()));
        assert!(!path.exists());
        assert!(dest.exists());
    }

    #[test]
    fn test_derived_is_deleted() {
        let (_temp, layout) = setup();
        let path = layout.raw_dir().join("inner.zip");
        fs::write(&path, b"zip").unwrap();
        let record = FileRecord::new(&path);
        let provenance = Provenance::default();

        let disposal = Disposer::new(&layout, &provenance).dispose(&record, FileCategory::Archive);

        assert_eq!(disposal, Disposal::Deleted);
        assert!(!path.exists());
        assert!(!originals_destination(&layout, &record).exists());
    }

    #[test]
    fn test_failure_is_retained() {
        let (_temp, layout) = setup();
        let record = FileRecord::new(layout.raw_dir().join("vanished.txt"));
        let provenance = Provenance::default();

        let disposal = Disposer::new(&layout, &provenance).dispose(&record, FileCategory::Text);

        assert!(matches!(disposal, Disposal::Retained(_)));
    }

    #[test]
    fn test_same_name_in_different_dirs_both_kept() {
        let (_temp, layout) = setup();
        let records: Vec<FileRecord> = ["a", "b"]
            .iter()
            .map(|dir| {
                let path = layout.raw_dir().join(dir).join("readme.txt");
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, *dir).unwrap();
                FileRecord::new(path)
            })
            .collect();
        let provenance = Provenance::snapshot(&records.iter().cloned().collect::<WorkSet>());
        let disposer = Disposer::new(&layout, &provenance);

        for record in &records {
            assert!(matches!(disposer.dispose(record, FileCategory::Text), Disposal::Moved(_)));
        }

        let txt = layout.originals_for(FileCategory::Text);
        assert_eq!(fs::read_to_string(txt.join("a").join("readme.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(txt.join("b").join("readme.txt")).unwrap(), "b");
    }

    #[test]
    fn test_existing_original_not_replaced() {
        let (_temp, layout) = setup();
        let txt = layout.originals_for(FileCategory::Text);
        fs::write(txt.join("notes.txt"), "first run").unwrap();
        let path = layout.raw_dir().join("notes.txt");
        fs::write(&path, "second run").unwrap();
        let record = FileRecord::new(&path);
        let provenance = Provenance::snapshot(&[record.clone()].into_iter().collect::<WorkSet>());

        let disposal = Disposer::new(&layout, &provenance).dispose(&record, FileCategory::Text);

        assert_eq!(disposal, Disposal::Moved(txt.join("notes-1.txt")));
        assert_eq!(fs::read_to_string(txt.join("notes.txt")).unwrap(), "first run");
        assert_eq!(fs::read_to_string(txt.join("notes-1.txt")).unwrap(), "second run");
    }
}
