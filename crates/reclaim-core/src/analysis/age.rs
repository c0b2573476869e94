/// File age analysis — find stale files that haven't been modified recently.
use crate::model::FileRecord;
use std::time::{Duration, SystemTime};

/// Twelve 30-day months.
pub const STALE_AFTER: Duration = Duration::from_secs(360 * 24 * 3600);

/// `true` when `modified` lies strictly more than `threshold` before `now`.
///
/// Files without a timestamp, or with one in the future, are never stale.
pub fn is_stale(modified: Option<SystemTime>, now: SystemTime, threshold: Duration) -> bool {
    modified
        .and_then(|m| now.duration_since(m).ok())
        .is_some_and(|age| age > threshold)
}

/// Whole days since `modified`, or `None` without a usable timestamp.
pub fn age_days(modified: Option<SystemTime>, now: SystemTime) -> Option<u64> {
    let age = now.duration_since(modified?).ok()?;
    Some(age.as_secs() / 86_400)
}

/// Sort records by size descending, breaking ties by path so output is stable.
pub fn sort_largest_first(records: &mut [FileRecord]) {
    records.sort_unstable_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
}
