/// Screen captures that have outlived their usefulness.
///
/// Detection is by file name only; a screenshot counts as old once its
/// modification time is more than `SCREENSHOT_AFTER` in the past.
use regex::{RegexSet, RegexSetBuilder};
use std::time::Duration;

/// Thirty days.
pub const SCREENSHOT_AFTER: Duration = Duration::from_secs(30 * 24 * 3600);

/// Case-insensitive name fragments of screen captures.
pub const SCREENSHOT_PATTERNS: &[&str] = &["screenshot", "captura", "print"];

pub struct ScreenshotMatcher {
    set: RegexSet,
}

impl ScreenshotMatcher {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self { set })
    }

    pub fn is_screenshot(&self, file_name: &str) -> bool {
        self.set.is_match(file_name)
    }
}

impl Default for ScreenshotMatcher {
    fn default() -> Self {
        Self::new(SCREENSHOT_PATTERNS).expect("built-in screenshot patterns are valid")
    }
}
