/// Scan progress reporting.
///
/// Progress is a single integer 0–100 owned by the scanner. Hosts either poll
/// it through `Scanner::progress()` or receive lightweight messages over a
/// crossbeam channel when the scan runs on a background thread.
use crate::error::Error;
use crate::model::ScanReport;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU8, Ordering};

/// Share of the bar given to the directory walk; hashing fills the rest.
pub const WALK_SHARE: u8 = 50;

/// Highest value reported before the scan has fully succeeded.
pub const MAX_IN_FLIGHT: u8 = 99;

/// Messages sent from the scan thread to the host.
#[derive(Debug)]
pub enum ScanProgress {
    /// The published percentage increased.
    Update { percent: u8 },
    /// Scanning completed successfully.
    Complete { report: Box<ScanReport> },
    /// The scan aborted; no partial report is delivered.
    Failed { error: Error },
}

/// Monotonic progress value for one scan.
///
/// Every write goes through `fetch_max`, so out-of-order completions from the
/// hash pool can never move the bar backwards.
#[derive(Debug, Default)]
pub(crate) struct ProgressCounter {
    value: AtomicU8,
}

impl ProgressCounter {
    pub(crate) fn get(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.value.store(0, Ordering::Release);
    }

    /// Raise progress to `percent` (capped below 100) and notify `observer`
    /// if the value actually moved.
    pub(crate) fn advance(&self, percent: u8, observer: Option<&Sender<ScanProgress>>) {
        let percent = percent.min(MAX_IN_FLIGHT);
        let previous = self.value.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            if let Some(tx) = observer {
                // A full channel only means the host is behind; drop the tick.
                let _ = tx.try_send(ScanProgress::Update { percent });
            }
        }
    }

    pub(crate) fn complete(&self, observer: Option<&Sender<ScanProgress>>) {
        self.value.store(100, Ordering::Release);
        if let Some(tx) = observer {
            let _ = tx.try_send(ScanProgress::Update { percent: 100 });
        }
    }
}

/// Map `done / total` onto the `[lo, hi]` slice of the bar.
pub(crate) fn phase_percent(done: usize, total: usize, lo: u8, hi: u8) -> u8 {
    if total == 0 {
        return hi;
    }
    let span = (hi - lo) as usize;
    let scaled = done.min(total) * span / total;
    lo + scaled as u8
}
