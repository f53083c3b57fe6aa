//! End-to-end intake run over the raw directory

use std::path::PathBuf;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::ingestion::{HandlerContext, HandlerSet, Route};
use crate::layout::DataLayout;
use crate::types::{FileCategory, ProcessingReport, WorkSet};

use super::{classify, ArchiveExpander, Disposer, Provenance};

/// Classifies the raw directory, expands archives, then converts every
/// remaining bucket with its category's handler
pub struct IntakePipeline {
    config: LoaderConfig,
    layout: DataLayout,
    handlers: HandlerSet,
}

impl IntakePipeline {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let handlers = HandlerSet::from_config(&config);
        Self::with_handlers(config, handlers)
    }

    /// Pipeline with a custom handler table
    pub fn with_handlers(config: LoaderConfig, handlers: HandlerSet) -> Result<Self> {
        config.validate()?;
        let layout = DataLayout::new(&config.data);
        Ok(Self {
            config,
            layout,
            handlers,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Run one intake pass.
    ///
    /// Only a failure to enumerate the raw directory is returned as an error;
    /// everything per-file ends up in the report.
    pub fn process_intake(&self) -> Result<ProcessingReport> {
        let mut work_set = classify(self.layout.raw_dir())?;
        self.layout.ensure()?;

        let provenance = Provenance::snapshot(&work_set);
        tracing::info!(
            "Found {} file(s) in {} bucket(s) under {}",
            provenance.len(),
            work_set.extensions().count(),
            self.layout.raw_dir().display()
        );

        let disposer = Disposer::new(&self.layout, &provenance);
        let expander = ArchiveExpander::new(&self.config.archive, &disposer);
        let mut report = ProcessingReport::default();

        loop {
            let archives = work_set.take_where(|ext| FileCategory::from_extension(ext).is_archive());
            if archives.is_empty() {
                break;
            }
            for (ext, bucket) in archives {
                tracing::info!("Expanding {} '{}' archive(s)", bucket.len(), ext);
                report.extend(expander.expand(bucket, &mut work_set));
            }
        }

        self.dispatch(work_set, &expander, &disposer, &mut report);

        tracing::info!(
            "Intake finished: {} processed, {} skipped, {} failed",
            report.processed().len(),
            report.skipped().count(),
            report.failures().count()
        );
        Ok(report)
    }

    /// Same run, reduced to the processed paths
    pub fn process_raw_dir(&self) -> Result<Vec<PathBuf>> {
        Ok(self.process_intake()?.processed())
    }

    fn dispatch(
        &self,
        mut work_set: WorkSet,
        expander: &ArchiveExpander<'_>,
        disposer: &Disposer<'_>,
        report: &mut ProcessingReport,
    ) {
        let ctx = HandlerContext::new(&self.layout, disposer);

        while let Some((ext, bucket)) = work_set.pop_bucket() {
            let category = FileCategory::from_extension(&ext);
            tracing::info!("Processing {} '{}' file(s) as {}", bucket.len(), ext, category);
            let outcomes = match self.handlers.route(category) {
                Route::Expand => expander.expand(bucket, &mut work_set),
                Route::Convert(handler) => handler.handle(category, bucket, &ctx),
            };
            report.extend(outcomes);
        }
    }
}
