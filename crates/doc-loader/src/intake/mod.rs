//! Intake: classification, provenance, archive expansion and dispatch

mod archive;
mod classifier;
mod disposal;
mod pipeline;
mod provenance;

pub use archive::{extraction_dir, ArchiveExpander};
pub use classifier::{classify, classify_into};
pub use disposal::Disposer;
pub use pipeline::IntakePipeline;
pub use provenance::Provenance;
