/// Streaming content hashing for duplicate detection.
///
/// Files are read in fixed-size chunks into an XXH3-128 state, so memory use
/// does not depend on file size. The hash phase runs on the rayon pool after
/// the walk; a failure on one file is logged and that file simply keeps no
/// hash.
use super::progress::{phase_percent, ProgressCounter, ScanProgress, MAX_IN_FLIGHT, WALK_SHARE};
use crate::model::{ContentHash, FileRecord, ScanFailure};
use crossbeam_channel::Sender;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};
use xxhash_rust::xxh3::Xxh3;

/// Read buffer size for streamed hashing.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Empty files would all collide; files at or above `limit` are too costly.
#[inline]
pub fn is_hashable(size: u64, limit: u64) -> bool {
    size > 0 && size < limit
}

/// Hash the full contents of `path`.
pub fn hash_file(path: &Path) -> io::Result<ContentHash> {
    let mut file = File::open(path)?;
    let mut hasher = Xxh3::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(ContentHash(hasher.digest128()))
}

/// Attach content hashes to every hashable record, in parallel.
///
/// Returns the records in their original order, plus one failure per file
/// that could not be hashed. Completion is counted through
/// one shared atomic so progress stays monotonic even though hashes finish out
/// of order. Once `cancel` is raised the remaining files are passed through
/// unhashed; the caller is expected to check the flag afterwards.
pub(crate) fn hash_records(
    records: Vec<FileRecord>,
    limit: u64,
    cancel: &AtomicBool,
    progress: &ProgressCounter,
    observer: Option<&Sender<ScanProgress>>,
) -> (Vec<FileRecord>, Vec<ScanFailure>) {
    let total = records.iter().filter(|r| is_hashable(r.size, limit)).count();
    let completed = AtomicUsize::new(0);

    let outcomes: Vec<(FileRecord, Option<ScanFailure>)> = records
        .into_par_iter()
        .map(|record| {
            if !is_hashable(record.size, limit) || cancel.load(Ordering::Relaxed) {
                return (record, None);
            }
            let outcome = match hash_file(&record.path) {
                Ok(hash) => (record.with_hash(hash), None),
                Err(err) => {
                    warn!("Error hashing {}: {err}", record.path.display());
                    let failure = ScanFailure {
                        path: record.path.clone(),
                        error: err.to_string(),
                    };
                    (record, Some(failure))
                }
            };
            let done = completed.fetch_add(1, Ordering::AcqRel) + 1;
            progress.advance(phase_percent(done, total, WALK_SHARE, MAX_IN_FLIGHT), observer);
            outcome
        })
        .collect();

    let mut hashed = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for (record, failure) in outcomes {
        hashed.push(record);
        failures.extend(failure);
    }

    debug!(
        "Hash phase: {} candidates, {} hashed, {} failed",
        total,
        completed.load(Ordering::Relaxed),
        failures.len()
    );
    (hashed, failures)
}
