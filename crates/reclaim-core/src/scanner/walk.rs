/// Depth-first directory walker built on `jwalk`.
///
/// Directories are read on a rayon pool but results arrive in sorted,
/// depth-first order, so the walk behaves like a sequential recursive
/// traversal. Hidden entries are dropped before they are yielded, and
/// directories past the depth limit are never read.
use super::progress::{phase_percent, ProgressCounter, ScanProgress, WALK_SHARE};
use crate::error::{Error, Result};
use crate::model::{FileRecord, ScanFailure};
use crossbeam_channel::Sender;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Output of one walk: every regular file plus the entries it had to skip.
#[derive(Debug, Default)]
pub(crate) struct WalkOutcome {
    pub files: Vec<FileRecord>,
    pub failures: Vec<ScanFailure>,
    pub pruned_dirs: u64,
}

/// Unix-style hidden entry, applied on every platform.
#[inline]
pub fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Walk `root` collecting regular files.
///
/// The root is depth 0; a directory at depth `d` is read only when
/// `d <= max_depth`. Failing to read the root itself aborts the walk, while
/// errors on anything below it are logged and counted. Cancellation is checked
/// between entries.
pub(crate) fn walk_tree(
    root: &Path,
    max_depth: usize,
    cancel: &AtomicBool,
    progress: &ProgressCounter,
    observer: Option<&Sender<ScanProgress>>,
) -> Result<WalkOutcome> {
    // Read the root eagerly: an unreadable root is fatal, and its visible
    // entry count drives the walk half of the progress bar.
    let root_total = fs::read_dir(root)
        .map_err(|e| Error::io(root, e))?
        .filter_map(|e| e.ok())
        .filter(|e| !is_hidden(&e.file_name()))
        .count();

    let pruned = Arc::new(AtomicU64::new(0));
    let pruned_in_walk = pruned.clone();

    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(jwalk::Parallelism::RayonNewPool(num_cpus::get()))
        .process_read_dir(move |depth, _path, _state, children| {
            // `None` is the synthetic read that yields the root entry itself.
            if depth.is_none() {
                return;
            }
            children.retain(|child| match child {
                Ok(entry) => !is_hidden(&entry.file_name),
                Err(_) => true,
            });
            for entry in children.iter_mut().flatten() {
                if entry.file_type.is_dir() && entry.depth > max_depth {
                    warn!(
                        "Reached maximum scan depth ({max_depth}) at: {}",
                        entry.path().display()
                    );
                    entry.read_children_path = None;
                    pruned_in_walk.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

    let mut outcome = WalkOutcome::default();
    let mut root_seen: usize = 0;

    for entry_result in walker {
        if cancel.load(Ordering::Relaxed) {
            debug!("Walk cancelled after {} files", outcome.files.len());
            return Err(Error::Cancelled);
        }

        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                let err_path = err.path().map(Path::to_path_buf).unwrap_or_default();
                warn!("Error reading entry {}: {err}", err_path.display());
                outcome.failures.push(ScanFailure {
                    path: err_path,
                    error: err.to_string(),
                });
                continue;
            }
        };

        if entry.depth == 0 {
            continue;
        }
        if entry.depth == 1 {
            // Everything under the previous root-level entry is finished.
            progress.advance(phase_percent(root_seen, root_total, 0, WALK_SHARE), observer);
            root_seen += 1;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match entry.metadata() {
            Ok(meta) => {
                outcome
                    .files
                    .push(FileRecord::new(path, meta.len(), meta.modified().ok()));
            }
            Err(err) => {
                warn!("Error reading metadata for {}: {err}", path.display());
                outcome.failures.push(ScanFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    progress.advance(WALK_SHARE, observer);
    outcome.pruned_dirs = pruned.load(Ordering::Relaxed);
    Ok(outcome)
}
