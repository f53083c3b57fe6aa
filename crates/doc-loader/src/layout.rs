//! Raw / processed / originals directory layout

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DataDirsConfig;
use crate::error::Result;
use crate::types::FileCategory;

/// The three data roots plus the per-category originals subdirectories
#[derive(Debug, Clone)]
pub struct DataLayout {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    originals_dir: PathBuf,
}

impl DataLayout {
    pub fn new(dirs: &DataDirsConfig) -> Self {
        Self {
            raw_dir: dirs.raw_dir.clone(),
            processed_dir: dirs.processed_dir.clone(),
            originals_dir: dirs.originals_dir.clone(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    pub fn originals_dir(&self) -> &Path {
        &self.originals_dir
    }

    /// Originals subdirectory for a category
    pub fn originals_for(&self, category: FileCategory) -> PathBuf {
        self.originals_dir.join(category.subdir_name())
    }

    /// Category name → originals subdirectory
    pub fn subdir_map(&self) -> BTreeMap<&'static str, PathBuf> {
        FileCategory::ALL
            .iter()
            .map(|c| (c.subdir_name(), self.originals_for(*c)))
            .collect()
    }

    /// Create every directory that is missing. Never deletes anything.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.raw_dir)?;
        fs::create_dir_all(&self.processed_dir)?;
        for dir in self.subdir_map().values() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Empty the processed directory
    pub fn reset_processed(&self) -> Result<()> {
        recreate(&self.processed_dir)
    }

    /// Empty the raw intake directory
    pub fn reset_raw(&self) -> Result<()> {
        recreate(&self.raw_dir)
    }

    /// Empty the originals directory and recreate one subdirectory per category
    pub fn reset_originals(&self) -> Result<BTreeMap<&'static str, PathBuf>> {
        recreate(&self.originals_dir)?;
        let subdirs = self.subdir_map();
        for dir in subdirs.values() {
            fs::create_dir_all(dir)?;
        }
        Ok(subdirs)
    }

    pub fn reset_all(&self) -> Result<()> {
        tracing::info!(
            "Resetting data directories under {}, {}, {}",
            self.raw_dir.display(),
            self.processed_dir.display(),
            self.originals_dir.display()
        );
        self.reset_processed()?;
        self.reset_raw()?;
        self.reset_originals()?;
        Ok(())
    }
}

fn recreate(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
