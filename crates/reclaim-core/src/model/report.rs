/// Aggregate result of one scan.
///
/// A report is assembled during a single `Scanner::scan` call and handed to
/// the caller as an owned snapshot. Nothing carries over between scans.
use super::file_record::{ContentHash, FileRecord};
use crate::analysis::file_types::{categorise_extension, FileCategory};
use compact_str::CompactString;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Count and byte total for one extension (or one category).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeStats {
    pub count: u64,
    pub total_size: u64,
}

impl TypeStats {
    pub fn add(&mut self, size: u64) {
        self.count += 1;
        self.total_size += size;
    }
}

/// Two or more files sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub hash: ContentHash,
    /// Always at least two members, sorted by path.
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Size of one copy.
    pub fn size(&self) -> u64 {
        self.members.first().map(|m| m.size).unwrap_or(0)
    }

    /// Bytes freed by keeping exactly one copy.
    pub fn wasted_bytes(&self) -> u64 {
        self.size() * (self.members.len() as u64).saturating_sub(1)
    }
}

/// An entry the scan could not read, stat, or hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Root the scan was started from.
    pub root: PathBuf,
    /// Regular, non-hidden files within the depth limit.
    pub total_files: u64,
    pub total_size: u64,
    /// Sorted by wasted bytes, largest first.
    pub duplicates: Vec<DuplicateGroup>,
    pub stale_files: Vec<FileRecord>,
    pub oversized_files: Vec<FileRecord>,
    /// Scratch files (`.tmp`, `.temp`, `.log`) that are usually safe to clear.
    pub temporary_files: Vec<FileRecord>,
    /// Screen captures older than the screenshot threshold.
    pub old_screenshots: Vec<FileRecord>,
    /// Extension (lowercased, dotted, or empty) to count/size.
    pub types: BTreeMap<CompactString, TypeStats>,
    /// Entries that could not be read or stat'ed and were skipped.
    pub skipped_entries: u64,
    /// Every walk and hash failure, sorted by path.
    pub failures: Vec<ScanFailure>,
    /// Directories not descended into because of the depth limit.
    pub pruned_dirs: u64,
    pub duration: Duration,
}

impl ScanReport {
    /// Bytes that removing every redundant duplicate copy would free.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.duplicates.iter().map(DuplicateGroup::wasted_bytes).sum()
    }

    /// Bytes freed by dropping redundant duplicates, temporary files, and old
    /// screenshots. A file on more than one list is counted once.
    pub fn freeable_bytes(&self) -> u64 {
        let mut counted: HashSet<&Path> = HashSet::new();
        let redundant = self
            .duplicates
            .iter()
            .flat_map(|g| g.members.iter().skip(1));
        redundant
            .chain(&self.temporary_files)
            .chain(&self.old_screenshots)
            .filter(|&f| counted.insert(f.path.as_path()))
            .map(|f| f.size)
            .sum()
    }

    /// Number of files that belong to some duplicate group.
    pub fn duplicate_file_count(&self) -> usize {
        self.duplicates.iter().map(|g| g.members.len()).sum()
    }

    /// The extension histogram regrouped into broad categories, largest first.
    pub fn categories(&self) -> Vec<(FileCategory, TypeStats)> {
        let mut map: BTreeMap<FileCategory, TypeStats> = BTreeMap::new();
        for (ext, stats) in &self.types {
            let entry = map.entry(categorise_extension(ext)).or_default();
            entry.count += stats.count;
            entry.total_size += stats.total_size;
        }
        let mut out: Vec<_> = map.into_iter().collect();
        out.sort_by(|a, b| b.1.total_size.cmp(&a.1.total_size));
        out
    }
}
