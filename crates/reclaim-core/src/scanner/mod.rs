/// Scanner module — orchestrates one scan from root path to `ScanReport`.
///
/// A scan runs in three phases:
/// - **Walk:** `jwalk`-based depth-first traversal collecting regular files.
/// - **Hash:** parallel XXH3-128 hashing of files in the hashable size range.
/// - **Classify:** totals, extension histogram, stale/oversized/temporary
///   lists, and duplicate grouping.
///
/// Each `Scanner` allows at most one scan in flight (single-flight guard) and
/// owns its own progress value, so independent instances never share state.
pub mod hash;
pub mod progress;
pub mod walk;

use crate::analysis::{
    age, group_duplicates, is_stale, is_temporary_extension, ScreenshotMatcher, SCREENSHOT_AFTER,
};
use crate::error::{Error, Result};
use crate::model::size::mib;
use crate::model::{FileRecord, ScanReport};
use progress::{ProgressCounter, ScanProgress};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Directories deeper than this below the root are not read.
pub const MAX_DEPTH: usize = 20;

/// Files strictly larger than this are reported as oversized.
pub const OVERSIZED_THRESHOLD: u64 = mib(100);

/// Files at or above this size are not hashed.
pub const HASH_LIMIT: u64 = mib(100);

/// Tunable thresholds. `Default` matches the named constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub stale_after: Duration,
    /// Screenshots older than this are listed as old screenshots.
    pub screenshot_after: Duration,
    pub oversized_threshold: u64,
    pub hash_limit: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            stale_after: age::STALE_AFTER,
            screenshot_after: SCREENSHOT_AFTER,
            oversized_threshold: OVERSIZED_THRESHOLD,
            hash_limit: HASH_LIMIT,
        }
    }
}

/// Lifecycle of a scanner instance.
///
/// The instance never returns to `Idle` after its first scan: it rests in
/// `Done` or `Failed` so callers can see how the most recent scan ended.
/// Both accept a new scan exactly like `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Done,
    Failed,
}

pub struct Scanner {
    options: ScanOptions,
    state: Mutex<ScanState>,
    progress: ProgressCounter,
    cancel_flag: AtomicBool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_options(ScanOptions::default())
    }

    pub fn with_options(options: ScanOptions) -> Self {
        Self {
            options,
            state: Mutex::new(ScanState::Idle),
            progress: ProgressCounter::default(),
            cancel_flag: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    /// Current progress, 0–100. Only 100 after a successful scan.
    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    /// Ask the running scan to stop at the next entry boundary.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Scan `root` and build a fresh report.
    ///
    /// Blocks until the scan finishes. Fails with `AlreadyScanning` if another
    /// scan is in flight on this instance, `NotFound` / `NotADirectory` for a
    /// bad root, and `Cancelled` when [`Scanner::cancel`] was called.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<ScanReport> {
        self.run(root.as_ref(), None)
    }

    fn run(&self, root: &Path, observer: Option<&Sender<ScanProgress>>) -> Result<ScanReport> {
        let guard = ScanGuard::acquire(self)?;
        let result = self.run_phases(root, observer);
        match &result {
            Ok(report) => {
                self.progress.complete(observer);
                guard.finish(ScanState::Done);
                info!(
                    "Scan of {} complete: {} files, {} duplicate groups in {:?}",
                    root.display(),
                    report.total_files,
                    report.duplicates.len(),
                    report.duration
                );
            }
            Err(err) => {
                guard.finish(ScanState::Failed);
                warn!("Scan of {} failed: {err}", root.display());
            }
        }
        result
    }

    fn run_phases(
        &self,
        root: &Path,
        observer: Option<&Sender<ScanProgress>>,
    ) -> Result<ScanReport> {
        let meta = fs::metadata(root).map_err(|e| Error::io(root, e))?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        info!("Starting scan of {}", root.display());
        let start = Instant::now();

        let outcome = walk::walk_tree(
            root,
            self.options.max_depth,
            &self.cancel_flag,
            &self.progress,
            observer,
        )?;
        debug!(
            "Walk complete: {} files in {:?}",
            outcome.files.len(),
            start.elapsed()
        );

        let (files, hash_failures) = hash::hash_records(
            outcome.files,
            self.options.hash_limit,
            &self.cancel_flag,
            &self.progress,
            observer,
        );
        if self.cancel_flag.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }

        let mut report = build_report(root, files, &self.options, SystemTime::now());
        report.skipped_entries = outcome.failures.len() as u64;
        report.failures = outcome.failures;
        report.failures.extend(hash_failures);
        report.failures.sort_by(|a, b| a.path.cmp(&b.path));
        report.pruned_dirs = outcome.pruned_dirs;
        report.duration = start.elapsed();
        Ok(report)
    }
}

/// Single-flight guard: flips the state to `Scanning` on acquire and always
/// leaves a terminal state behind, even if the scan panics.
struct ScanGuard<'a> {
    scanner: &'a Scanner,
    terminal: ScanState,
}

impl<'a> ScanGuard<'a> {
    fn acquire(scanner: &'a Scanner) -> Result<Self> {
        let mut state = scanner.state.lock();
        if *state == ScanState::Scanning {
            return Err(Error::AlreadyScanning);
        }
        *state = ScanState::Scanning;
        scanner.progress.reset();
        scanner.cancel_flag.store(false, Ordering::Relaxed);
        Ok(Self {
            scanner,
            terminal: ScanState::Failed,
        })
    }

    fn finish(mut self, terminal: ScanState) {
        self.terminal = terminal;
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        *self.scanner.state.lock() = self.terminal;
    }
}

/// Fold walked (and possibly hashed) records into a report.
fn build_report(
    root: &Path,
    files: Vec<FileRecord>,
    options: &ScanOptions,
    now: SystemTime,
) -> ScanReport {
    let mut report = ScanReport {
        root: root.to_path_buf(),
        ..Default::default()
    };
    let screenshots = ScreenshotMatcher::default();

    for file in &files {
        report.total_files += 1;
        report.total_size += file.size;
        report
            .types
            .entry(file.extension.clone())
            .or_default()
            .add(file.size);

        if is_stale(file.modified, now, options.stale_after) {
            report.stale_files.push(file.clone());
        }
        if file.size > options.oversized_threshold {
            report.oversized_files.push(file.clone());
        }
        if is_temporary_extension(&file.extension) {
            report.temporary_files.push(file.clone());
        }
        if is_stale(file.modified, now, options.screenshot_after)
            && screenshots.is_screenshot(&file.file_name())
        {
            report.old_screenshots.push(file.clone());
        }
    }

    age::sort_largest_first(&mut report.stale_files);
    age::sort_largest_first(&mut report.oversized_files);
    age::sort_largest_first(&mut report.temporary_files);
    age::sort_largest_first(&mut report.old_screenshots);
    report.duplicates = group_duplicates(files);
    report
}

/// Maximum number of progress messages that may queue up in the channel.
///
/// Updates are sent with `try_send`, so a slow host drops ticks instead of
/// stalling the scan; the terminal message is always delivered.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Handle to a scan running on a background thread.
pub struct ScanHandle {
    /// Progress ticks followed by exactly one `Complete` or `Failed`.
    pub progress_rx: Receiver<ScanProgress>,
    scanner: Arc<Scanner>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Latest progress value, polled from the scanner.
    pub fn progress(&self) -> u8 {
        self.scanner.progress()
    }

    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.scanner.cancel();
    }

}

/// Start a scan of `root` on a background thread.
///
/// The single-flight guard still applies: if `scanner` is busy, the handle
/// receives `Failed { error: AlreadyScanning }`.
pub fn start_scan(scanner: Arc<Scanner>, root: PathBuf) -> Result<ScanHandle> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let worker = scanner.clone();
    let spawn_root = root.clone();

    let thread = thread::Builder::new()
        .name("reclaim-scanner".into())
        .spawn(move || {
            let msg = match worker.run(&spawn_root, Some(&progress_tx)) {
                Ok(report) => ScanProgress::Complete {
                    report: Box::new(report),
                },
                Err(error) => ScanProgress::Failed { error },
            };
            // Blocking send: the terminal message must not be dropped.
            let _ = progress_tx.send(msg);
        })
        .map_err(|e| Error::io(&root, e))?;

    Ok(ScanHandle {
        progress_rx,
        scanner,
        _thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(path: &str, size: u64, modified: Option<SystemTime>) -> FileRecord {
        FileRecord::new(PathBuf::from(path), size, modified)
    }

    #[test]
    fn default_options_match_constants() {
        let opts = ScanOptions::default();
        assert_eq!(opts.max_depth, 20);
        assert_eq!(opts.oversized_threshold, 100 * 1024 * 1024);
        assert_eq!(opts.hash_limit, 100 * 1024 * 1024);
    }

    #[test]
    fn build_report_classifies_each_file() {
        let now = SystemTime::now();
        let old = now - Duration::from_secs(400 * 86_400);
        let opts = ScanOptions {
            oversized_threshold: 1_000,
            ..Default::default()
        };
        let files = vec![
            record("notes.TXT", 10, Some(now)),
            record("old.log", 20, Some(old)),
            record("huge.bin", 5_000, Some(now)),
        ];

        let report = build_report(Path::new("root"), files, &opts, now);
        assert_eq!(report.total_files, 3);
        assert_eq!(report.total_size, 5_030);
        assert_eq!(report.stale_files.len(), 1);
        assert_eq!(report.stale_files[0].file_name(), "old.log");
        assert_eq!(report.oversized_files.len(), 1);
        assert_eq!(report.oversized_files[0].file_name(), "huge.bin");
        assert_eq!(report.temporary_files.len(), 1);
        assert_eq!(report.types[".txt"].count, 1);
        assert_eq!(report.types[".log"].total_size, 20);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn oversized_threshold_is_strict() {
        let opts = ScanOptions {
            oversized_threshold: 100,
            ..Default::default()
        };
        let files = vec![record("exact", 100, None), record("over", 101, None)];
        let report = build_report(Path::new("r"), files, &opts, SystemTime::now());
        assert_eq!(report.oversized_files.len(), 1);
        assert_eq!(report.oversized_files[0].file_name(), "over");
    }

    #[test]
    fn only_old_screenshots_are_listed() {
        let now = SystemTime::now();
        let days = |n: u64| now - Duration::from_secs(n * 86_400);
        let files = vec![
            record("Screenshot 1.png", 10, Some(days(31))),
            record("captura_recente.png", 20, Some(days(2))),
            record("holiday.png", 30, Some(days(90))),
            record("PRINT.jpg", 40, Some(days(45))),
            record("print-undated.png", 50, None),
        ];
        let report = build_report(Path::new("r"), files, &ScanOptions::default(), now);
        let names: Vec<String> = report.old_screenshots.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, ["PRINT.jpg", "Screenshot 1.png"]);
        assert_eq!(report.freeable_bytes(), 50);
    }

    #[test]
    fn state_transitions_to_done() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"hello").unwrap();
        let scanner = Scanner::new();
        assert_eq!(scanner.state(), ScanState::Idle);
        scanner.scan(tmp.path()).unwrap();
        assert_eq!(scanner.state(), ScanState::Done);
        assert_eq!(scanner.progress(), 100);
    }

    #[test]
    fn failed_scan_releases_guard() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new();
        let err = scanner.scan(tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(scanner.state(), ScanState::Failed);
        assert!(scanner.progress() < 100);

        // Reusable after failure.
        scanner.scan(tmp.path()).unwrap();
        assert_eq!(scanner.state(), ScanState::Done);
    }

    #[test]
    fn busy_scanner_rejects_second_scan() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new();
        *scanner.state.lock() = ScanState::Scanning;
        let err = scanner.scan(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::AlreadyScanning));
        // The rejected call must not clobber the in-flight state.
        assert_eq!(scanner.state(), ScanState::Scanning);
    }
}
