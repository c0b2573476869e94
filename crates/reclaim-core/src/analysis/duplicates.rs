/// Duplicate file detection from content hashes.
///
/// The hash phase has already filtered out empty and oversized files, so any
/// record carrying a hash is a candidate. Groups are only materialised for
/// hashes seen at least twice.
use crate::model::{ContentHash, DuplicateGroup, FileRecord};
use std::collections::HashMap;

/// Group hashed records by content hash.
///
/// Records without a hash are ignored. Members are sorted by path and groups
/// by wasted bytes descending (ties by hash), so results are deterministic
/// regardless of the order hashes completed in.
pub fn group_duplicates<I>(records: I) -> Vec<DuplicateGroup>
where
    I: IntoIterator<Item = FileRecord>,
{
    let mut by_hash: HashMap<ContentHash, Vec<FileRecord>> = HashMap::new();
    for record in records {
        if let Some(hash) = record.content_hash {
            by_hash.entry(hash).or_default().push(record);
        }
    }

    let mut groups: Vec<DuplicateGroup> = by_hash
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(hash, mut members)| {
            members.sort_by(|a, b| a.path.cmp(&b.path));
            DuplicateGroup { hash, members }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.wasted_bytes()
            .cmp(&a.wasted_bytes())
            .then_with(|| a.hash.cmp(&b.hash))
    });
    groups
}
