/// Output rendering — plain-text summaries, JSON, and CSV export.
use chrono::{DateTime, Local};
use reclaim_core::analysis::age::age_days;
use reclaim_core::model::size::{format_count, format_size};
use reclaim_core::model::FileRecord;
use reclaim_core::organizer::{MoveOperation, MoveResult, OrganizeSummary};
use reclaim_core::ScanReport;
use serde::Serialize;
use std::fmt::Write as _;
use std::io;
use std::time::SystemTime;

/// Human-readable scan summary listing at most `top` entries per section.
pub fn render_report(report: &ScanReport, top: usize) -> String {
    let now = SystemTime::now();
    let mut out = String::new();

    let _ = writeln!(out, "Scanned {}", report.root.display());
    let _ = writeln!(
        out,
        "  {} files, {} in {:.2}s",
        format_count(report.total_files),
        format_size(report.total_size),
        report.duration.as_secs_f64()
    );
    let _ = writeln!(
        out,
        "  {} freeable (duplicates, temporary files, old screenshots)",
        format_size(report.freeable_bytes())
    );
    if report.skipped_entries > 0 || report.pruned_dirs > 0 {
        let _ = writeln!(
            out,
            "  {} entries skipped, {} directories past the depth limit",
            report.skipped_entries, report.pruned_dirs
        );
    }

    let _ = writeln!(
        out,
        "\nDuplicates: {} groups, {} files, {} reclaimable",
        report.duplicates.len(),
        report.duplicate_file_count(),
        format_size(report.reclaimable_bytes())
    );
    for group in report.duplicates.iter().take(top) {
        let _ = writeln!(
            out,
            "  {} x{} ({} each)",
            group.hash,
            group.members.len(),
            format_size(group.size())
        );
        for member in &group.members {
            let _ = writeln!(out, "    {}", member.path.display());
        }
    }

    section(&mut out, "Stale files", &report.stale_files, top, |f| {
        match age_days(f.modified, now) {
            Some(days) => format!("{days} days old"),
            None => String::new(),
        }
    });
    section(&mut out, "Oversized files", &report.oversized_files, top, |_| String::new());
    section(&mut out, "Temporary files", &report.temporary_files, top, |_| String::new());
    section(&mut out, "Old screenshots", &report.old_screenshots, top, |f| {
        match age_days(f.modified, now) {
            Some(days) => format!("{days} days old"),
            None => String::new(),
        }
    });

    if !report.failures.is_empty() {
        let _ = writeln!(out, "\nUnreadable: {}", report.failures.len());
        for failure in report.failures.iter().take(top) {
            let _ = writeln!(out, "  {}: {}", failure.path.display(), failure.error);
        }
    }

    let _ = writeln!(out, "\nBy category:");
    for (category, stats) in report.categories() {
        let _ = writeln!(
            out,
            "  {:<12} {:>8} files {:>10}",
            category.label(),
            format_count(stats.count),
            format_size(stats.total_size)
        );
    }
    out
}

fn section(
    out: &mut String,
    title: &str,
    files: &[FileRecord],
    top: usize,
    note: impl Fn(&FileRecord) -> String,
) {
    let total: u64 = files.iter().map(|f| f.size).sum();
    let _ = writeln!(out, "\n{title}: {} ({})", files.len(), format_size(total));
    for file in files.iter().take(top) {
        let extra = note(file);
        if extra.is_empty() {
            let _ = writeln!(out, "  {:>10}  {}", format_size(file.size), file.path.display());
        } else {
            let _ = writeln!(
                out,
                "  {:>10}  {}  ({extra})",
                format_size(file.size),
                file.path.display()
            );
        }
    }
    if files.len() > top {
        let _ = writeln!(out, "  … and {} more", files.len() - top);
    }
}

pub fn render_move(result: &MoveResult) -> String {
    match &result.category {
        Some(cat) => format!(
            "{} -> {}  [{cat}]",
            result.from.display(),
            result.to.display()
        ),
        None => format!("{} -> {}", result.from.display(), result.to.display()),
    }
}

pub fn render_summary(summary: &OrganizeSummary) -> String {
    let mut out = String::new();
    for result in &summary.results {
        let _ = writeln!(out, "  {}", render_move(result));
    }
    for failure in &summary.failures {
        let _ = writeln!(out, "  FAILED {}: {}", failure.path.display(), failure.error);
    }
    let _ = writeln!(
        out,
        "{} processed, {} moved, {} failed",
        summary.total_processed, summary.successful, summary.failed
    );
    out
}

pub fn render_history(history: &[MoveOperation]) -> String {
    let mut out = String::new();
    for (i, op) in history.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}. {}  {} -> {}",
            i + 1,
            op.timestamp.format("%Y-%m-%d %H:%M:%S"),
            op.source.display(),
            op.destination.display()
        );
    }
    out
}

/// Pretty-printed JSON for any serialisable result.
pub fn write_json<W: io::Write, T: Serialize + ?Sized>(writer: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// One flattened line of the CSV export.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    kind: &'static str,
    group: Option<String>,
    path: String,
    size: u64,
    modified: Option<String>,
    extension: &'a str,
}

impl<'a> CsvRow<'a> {
    fn new(kind: &'static str, group: Option<String>, file: &'a FileRecord) -> Self {
        Self {
            kind,
            group,
            path: file.path.display().to_string(),
            size: file.size,
            modified: file
                .modified
                .map(|m| DateTime::<Local>::from(m).to_rfc3339()),
            extension: file.extension.as_str(),
        }
    }
}

/// Every flagged file as CSV: duplicates (tagged with their group hash),
/// stale, oversized, temporary files, and old screenshots.
pub fn write_csv<W: io::Write>(writer: W, report: &ScanReport) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for group in &report.duplicates {
        for member in &group.members {
            wtr.serialize(CsvRow::new("duplicate", Some(group.hash.to_string()), member))?;
        }
    }
    for file in &report.stale_files {
        wtr.serialize(CsvRow::new("stale", None, file))?;
    }
    for file in &report.oversized_files {
        wtr.serialize(CsvRow::new("oversized", None, file))?;
    }
    for file in &report.temporary_files {
        wtr.serialize(CsvRow::new("temporary", None, file))?;
    }
    for file in &report.old_screenshots {
        wtr.serialize(CsvRow::new("old_screenshot", None, file))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_core::model::{ContentHash, DuplicateGroup, ScanFailure};
    use std::path::PathBuf;

    fn sample_report() -> ScanReport {
        let rec = |p: &str| {
            FileRecord::new(PathBuf::from(p), 10, None).with_hash(ContentHash(0xfeed))
        };
        ScanReport {
            root: PathBuf::from("/data"),
            total_files: 3,
            total_size: 30,
            duplicates: vec![DuplicateGroup {
                hash: ContentHash(0xfeed),
                members: vec![rec("/data/a.txt"), rec("/data/b.txt")],
            }],
            stale_files: vec![FileRecord::new(PathBuf::from("/data/old.log"), 10, None)],
            ..Default::default()
        }
    }

    #[test]
    fn text_report_mentions_duplicates() {
        let text = render_report(&sample_report(), 10);
        assert!(text.contains("Duplicates: 1 groups, 2 files, 10 B reclaimable"));
        assert!(text.contains("/data/b.txt"));
        assert!(text.contains("Stale files: 1"));
    }

    #[test]
    fn text_report_lists_screenshots_and_failures() {
        let mut report = sample_report();
        report.old_screenshots = vec![FileRecord::new(PathBuf::from("/data/print.png"), 90, None)];
        report.failures = vec![ScanFailure {
            path: PathBuf::from("/data/locked.bin"),
            error: "permission denied".into(),
        }];
        let text = render_report(&report, 10);
        assert!(text.contains("Old screenshots: 1 (90 B)"));
        assert!(text.contains("/data/print.png"));
        // one redundant copy (10) plus the screenshot (90)
        assert!(text.contains("100 B freeable"));
        assert!(text.contains("/data/locked.bin: permission denied"));

        let mut buf = Vec::new();
        write_csv(&mut buf, &report).unwrap();
        let csv_text = String::from_utf8(buf).unwrap();
        assert!(csv_text.lines().last().unwrap().starts_with("old_screenshot,,/data/print.png,90"));
    }

    #[test]
    fn text_report_truncates_sections() {
        let mut report = sample_report();
        report.stale_files = (0..5)
            .map(|i| FileRecord::new(PathBuf::from(format!("/s{i}")), 1, None))
            .collect();
        let text = render_report(&report, 2);
        assert!(text.contains("and 3 more"));
    }

    #[test]
    fn csv_has_header_and_one_row_per_file() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "kind,group,path,size,modified,extension");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("duplicate,"));
        assert!(lines[3].starts_with("stale,,/data/old.log,10,,.log"));
    }

    #[test]
    fn json_round_trips_through_value() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample_report()).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["total_files"], 3);
        assert_eq!(v["duplicates"][0]["members"].as_array().unwrap().len(), 2);
    }
}
