/// Analysis helpers — classification and grouping used while building a report.

pub mod age;
pub mod duplicates;
pub mod file_types;
pub mod screenshots;

pub use age::{is_stale, STALE_AFTER};
pub use duplicates::group_duplicates;
pub use file_types::{categorise_extension, is_temporary_extension, FileCategory};
pub use screenshots::{ScreenshotMatcher, SCREENSHOT_AFTER};
