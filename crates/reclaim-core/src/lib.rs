/// Reclaim Core — scanning, organizing, analysis, and data model.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, daemon, desktop shell).
///
/// # Modules
///
/// - [`model`] — File records, scan reports, and size formatting.
/// - [`scanner`] — Single-flight filesystem scanning with progress reporting.
/// - [`analysis`] — Classification helpers used while building a report.
/// - [`organizer`] — Rule-based file relocation with an undo stack.
/// - [`error`] — Error taxonomy shared by every operation.
pub mod analysis;
pub mod error;
pub mod model;
pub mod organizer;
pub mod scanner;

pub use error::{Error, Result};
pub use model::{DuplicateGroup, FileRecord, ScanReport};
pub use organizer::{MoveOperation, MoveResult, OrganizeSummary, Organizer};
pub use scanner::{ScanOptions, ScanState, Scanner};
