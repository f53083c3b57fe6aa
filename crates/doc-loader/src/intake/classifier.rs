//! Directory walk that groups files by extension

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::{FileRecord, WorkSet};

/// Classify every regular file beneath `root` into a fresh work set
pub fn classify(root: &Path) -> Result<WorkSet> {
    let mut set = WorkSet::new();
    classify_into(root, &mut set)?;
    Ok(set)
}

/// Additive classification: append files beneath `root` to `set`.
///
/// Returns the number of files added. Fails only when `root` itself cannot be
/// enumerated; unreadable entries below it are logged and skipped.
pub fn classify_into(root: &Path, set: &mut WorkSet) -> Result<usize> {
    if !root.is_dir() {
        return Err(Error::IntakeRoot {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut added = 0;
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::IntakeRoot {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() {
            if set.push(FileRecord::new(entry.into_path())) {
                added += 1;
            }
        }
    }

    tracing::debug!("Classified {} files under {}", added, root.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_every_file_in_exactly_one_bucket() {
        let temp = TempDir::new().unwrap();
        let files = ["a.txt", "B.TXT", "docs/c.docx", "docs/deep/d.zip", "Makefile", ".hidden"];
        for f in files {
            touch(temp.path(), f);
        }

        let set = classify(temp.path()).unwrap();
        assert_eq!(set.len(), files.len());

        let mut seen = HashSet::new();
        for (ext, bucket) in set.iter() {
            for record in bucket {
                assert_eq!(record.extension, ext);
                assert!(seen.insert(record.path.clone()), "duplicate {:?}", record.path);
            }
        }
        assert_eq!(seen.len(), files.len());

        assert_eq!(set.get("txt").unwrap().len(), 2);
        assert_eq!(set.get("other").unwrap().len(), 2);
        assert_eq!(set.get("docx").unwrap().len(), 1);
        assert_eq!(set.get("zip").unwrap().len(), 1);
    }

    #[test]
    fn test_additive_mode_appends() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "one.txt");
        touch(second.path(), "two.txt");

        let mut set = classify(first.path()).unwrap();
        let added = classify_into(second.path(), &mut set).unwrap();

        assert_eq!(added, 1);
        let bucket = set.get("txt").unwrap();
        assert_eq!(bucket.len(), 2);
        assert!(bucket[0].path.ends_with("one.txt"));
        assert!(bucket[1].path.ends_with("two.txt"));
    }

    #[test]
    fn test_rewalk_adds_nothing() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");
        touch(temp.path(), "sub/b.txt");

        let mut set = classify(temp.path()).unwrap();
        let added = classify_into(&temp.path().join("sub"), &mut set).unwrap();

        assert_eq!(added, 0);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_discovery_order_is_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "c.txt");
        touch(temp.path(), "a.txt");
        touch(temp.path(), "b.txt");

        let set = classify(temp.path()).unwrap();
        let names: Vec<_> = set.get("txt").unwrap().iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let result = classify(&temp.path().join("missing"));
        assert!(matches!(result, Err(Error::IntakeRoot { .. })));
    }
}
