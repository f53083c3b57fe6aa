//! doc-loader: file intake pipeline that turns a raw drop directory into markdown
//!
//! Files under the raw directory are grouped by extension, archives are
//! expanded recursively, and every remaining file is converted by the handler
//! for its category. Word documents are extracted in body order into headings,
//! paragraphs, list items, tables and embedded objects and rendered to
//! markdown next to a folder of their media.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod intake;
pub mod layout;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::LoaderConfig;
pub use error::{Error, Result};
pub use intake::IntakePipeline;
pub use layout::DataLayout;
pub use types::{DocumentElement, FileCategory, FileRecord, ProcessingReport, WorkSet};
