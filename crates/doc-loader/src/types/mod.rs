//! Core types for the intake pipeline

pub mod document;
pub mod file_record;
pub mod work_set;

pub use document::{DocumentElement, FileCategory, ListKind};
pub use file_record::{
    extension_of, Disposal, FileOutcome, FileRecord, OutcomeStatus, ProcessingReport,
    NO_EXTENSION,
};
pub use work_set::WorkSet;
