/// Session state management.
///
/// Centralises the mutable state a host needs around the core: the scanner
/// and its background handle, the latest report, and the organizer with its
/// undo history. The scan thread communicates via a channel; state updates
/// happen in `process_scan_messages()`, which the host calls on a timer.
use reclaim_core::organizer::{MoveOperation, MoveResult, OrganizeSummary, Organizer};
use reclaim_core::scanner::progress::ScanProgress;
use reclaim_core::scanner::{start_scan, ScanHandle, ScanOptions, Scanner};
use reclaim_core::{Result, ScanReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The current phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No scan in progress, possibly holding previous results.
    Idle,
    Scanning,
    /// Scan complete — `report` is available.
    Results,
    /// The last scan failed or was cancelled — `last_error` says why.
    Failed,
}

/// Maximum number of scan messages drained per poll.
///
/// Keeps one poll short even if the host fell behind and the channel is full
/// of progress ticks.
const MAX_MESSAGES_PER_POLL: usize = 300;

pub struct Session {
    pub phase: SessionPhase,
    /// Last progress value observed, 0–100.
    pub progress: u8,
    pub report: Option<ScanReport>,
    pub last_error: Option<String>,
    pub scan_started: Option<Instant>,
    scanner: Arc<Scanner>,
    scan_handle: Option<ScanHandle>,
    organizer: Organizer,
}

impl Session {
    /// Create a session whose organizer files into `destination_root`.
    pub fn new(options: ScanOptions, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            phase: SessionPhase::Idle,
            progress: 0,
            report: None,
            last_error: None,
            scan_started: None,
            scanner: Arc::new(Scanner::with_options(options)),
            scan_handle: None,
            organizer: Organizer::new(destination_root),
        }
    }

    // ── Scan ───────────────────────────────────────────

    /// Start a background scan of `path`, discarding previous results.
    pub fn start_scan(&mut self, path: PathBuf) {
        self.phase = SessionPhase::Scanning;
        self.progress = 0;
        self.report = None;
        self.last_error = None;
        self.scan_started = Some(Instant::now());

        match start_scan(self.scanner.clone(), path) {
            Ok(handle) => self.scan_handle = Some(handle),
            Err(err) => {
                self.phase = SessionPhase::Failed;
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Cancel any running scan.
    pub fn cancel_scan(&self) {
        if let Some(ref handle) = self.scan_handle {
            handle.cancel();
        }
    }

    /// Drain pending scan messages and update the session.
    ///
    /// Returns `true` if anything changed.
    pub fn process_scan_messages(&mut self) -> bool {
        let handle = match &self.scan_handle {
            Some(h) => h,
            None => return false,
        };

        let mut changed = false;
        let mut finished = false;
        for _ in 0..MAX_MESSAGES_PER_POLL {
            let msg = match handle.progress_rx.try_recv() {
                Ok(m) => m,
                Err(_) => break,
            };
            changed = true;
            match msg {
                ScanProgress::Update { percent } => {
                    self.progress = self.progress.max(percent);
                }
                ScanProgress::Complete { report } => {
                    self.progress = 100;
                    self.report = Some(*report);
                    self.phase = SessionPhase::Results;
                    finished = true;
                    break;
                }
                ScanProgress::Failed { error } => {
                    self.last_error = Some(error.to_string());
                    self.phase = SessionPhase::Failed;
                    finished = true;
                    break;
                }
            }
        }

        // Ticks may have been dropped on a full channel; the accessor is
        // authoritative while the scan is still running.
        if !finished {
            let polled = handle.progress();
            if polled > self.progress {
                self.progress = polled;
                changed = true;
            }
        }
        if finished {
            self.scan_handle = None;
        }
        changed
    }

    /// Poll until the scan leaves `Scanning`, calling `on_progress` whenever
    /// the value changes. Returns `false` if `timeout` elapsed first.
    pub fn wait_for_scan(
        &mut self,
        poll_interval: Duration,
        timeout: Option<Duration>,
        mut on_progress: impl FnMut(u8),
    ) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut last_reported = None;
        while self.phase == SessionPhase::Scanning {
            self.process_scan_messages();
            if last_reported != Some(self.progress) {
                on_progress(self.progress);
                last_reported = Some(self.progress);
            }
            if self.phase != SessionPhase::Scanning {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }
            std::thread::sleep(poll_interval);
        }
        true
    }

    // ── Organizer ──────────────────────────────────────

    pub fn organizer(&self) -> &Organizer {
        &self.organizer
    }

    /// Organize each path in turn. Each result is independent.
    pub fn organize_files(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<MoveResult>)> {
        paths
            .iter()
            .map(|p| (p.clone(), self.organizer.organize_file(p)))
            .collect()
    }

    pub fn organize_directory(&self, dir: &Path) -> Result<OrganizeSummary> {
        self.organizer.organize_directory(dir)
    }

    pub fn undo(&self) -> Result<MoveResult> {
        self.organizer.undo()
    }

    pub fn history(&self) -> Vec<MoveOperation> {
        self.organizer.history()
    }
}
