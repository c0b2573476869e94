/// Data model for scan results.
///
/// Re-exports the per-file record, duplicate groups, and the aggregate report.
pub mod file_record;
pub mod report;
pub mod size;

pub use file_record::{extension_of, ContentHash, FileRecord};
pub use report::{DuplicateGroup, ScanFailure, ScanReport, TypeStats};
