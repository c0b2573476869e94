/// Argument parsing and command dispatch.
use crate::render;
use crate::state::{Session, SessionPhase};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use reclaim_core::model::size::mib;
use reclaim_core::organizer::{MoveResult, OrganizeSummary};
use reclaim_core::scanner::{ScanOptions, MAX_DEPTH};
use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// How often the foreground polls a running scan.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const DAY: u64 = 24 * 60 * 60;

/// Upper bounds for the threshold flags; larger values would overflow once
/// converted to seconds or bytes.
const MAX_DAYS: u64 = 100 * 365;
const MAX_OVERSIZED_MIB: u64 = 16 * 1024 * 1024;

#[derive(Debug, Parser)]
#[command(name = "reclaim", version, about = "Find reclaimable disk space and tidy loose files")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a directory tree for duplicates, stale, oversized and temporary files.
    Scan(ScanArgs),
    /// Move files into category folders.
    Organize(OrganizeArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan.
    pub root: PathBuf,

    /// Print the full report as JSON instead of a text summary.
    #[arg(long)]
    pub json: bool,

    /// Also write every flagged file to this CSV file.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Directories deeper than this below the root are skipped.
    #[arg(long, default_value_t = MAX_DEPTH)]
    pub max_depth: usize,

    /// Files not modified for more than this many days are stale.
    #[arg(long, default_value_t = 360, value_parser = clap::value_parser!(u64).range(0..=MAX_DAYS))]
    pub stale_days: u64,

    /// Screenshots older than this many days are listed as freeable.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(0..=MAX_DAYS))]
    pub screenshot_days: u64,

    /// Files larger than this many MiB are oversized.
    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(0..=MAX_OVERSIZED_MIB)
    )]
    pub oversized_mib: u64,

    /// Cancel the scan if it has not finished after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Entries listed per section of the text summary.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

impl ScanArgs {
    pub fn options(&self) -> ScanOptions {
        ScanOptions {
            max_depth: self.max_depth,
            stale_after: Duration::from_secs(self.stale_days * DAY),
            screenshot_after: Duration::from_secs(self.screenshot_days * DAY),
            oversized_threshold: mib(self.oversized_mib),
            ..ScanOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Files to move, or directories whose direct files are moved.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Root under which category folders are created. Defaults to the
    /// directory being organized when exactly one directory is given.
    #[arg(long, value_name = "DIR")]
    pub into: Option<PathBuf>,

    /// Show where each file would go without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Revert this many of the moves just made, newest first.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub undo_last: usize,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

impl OrganizeArgs {
    fn destination_root(&self) -> anyhow::Result<PathBuf> {
        if let Some(ref into) = self.into {
            return Ok(into.clone());
        }
        match self.paths.as_slice() {
            [only] if only.is_dir() => Ok(only.clone()),
            _ => bail!("--into is required unless a single directory is organized"),
        }
    }
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Scan(args) => run_scan(&args),
        Command::Organize(args) => run_organize(&args),
    }
}

fn run_scan(args: &ScanArgs) -> anyhow::Result<()> {
    // The organizer is unused while scanning; the root keeps it harmless.
    let mut session = Session::new(args.options(), &args.root);
    session.start_scan(args.root.clone());

    let show_progress = !args.json && io::stderr().is_terminal();
    let mut report_progress = |percent: u8| {
        if show_progress {
            eprint!("\rScanning... {percent:>3}%");
        }
    };
    let timeout = args.timeout.map(Duration::from_secs);
    if !session.wait_for_scan(POLL_INTERVAL, timeout, &mut report_progress) {
        warn!("Scan still running after {}s, cancelling", args.timeout.unwrap_or(0));
        session.cancel_scan();
        session.wait_for_scan(POLL_INTERVAL, None, &mut report_progress);
    }
    if show_progress {
        eprintln!();
    }

    let report = match session.phase {
        SessionPhase::Results => session
            .report
            .take()
            .context("scan finished without a report")?,
        _ => {
            let reason = session
                .last_error
                .take()
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("scan of {} failed: {reason}", args.root.display());
        }
    };

    if let Some(ref csv_path) = args.csv {
        let file = File::create(csv_path)
            .with_context(|| format!("cannot create {}", csv_path.display()))?;
        render::write_csv(BufWriter::new(file), &report)?;
        info!(path = %csv_path.display(), "CSV export written");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        render::write_json(&mut out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::render_report(&report, args.top))?;
    }
    Ok(())
}

fn run_organize(args: &OrganizeArgs) -> anyhow::Result<()> {
    let root = args.destination_root()?;
    let session = Session::new(ScanOptions::default(), root);

    if args.dry_run {
        return preview(&session, &args.paths, args.json);
    }

    let mut summary = OrganizeSummary::default();
    for path in &args.paths {
        if path.is_dir() {
            let batch = session
                .organize_directory(path)
                .with_context(|| format!("cannot organize {}", path.display()))?;
            merge(&mut summary, batch);
        } else {
            for (path, outcome) in session.organize_files(std::slice::from_ref(path)) {
                summary.total_processed += 1;
                match outcome {
                    Ok(result) => {
                        summary.successful += 1;
                        summary.results.push(result);
                    }
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "could not organize file");
                        summary.failed += 1;
                        summary.failures.push(reclaim_core::organizer::OrganizeFailure {
                            path,
                            error: err.to_string(),
                        });
                    }
                }
            }
        }
    }

    let mut undone = Vec::new();
    for _ in 0..args.undo_last {
        match session.undo() {
            Ok(result) => undone.push(result),
            Err(reclaim_core::Error::NoHistory) => break,
            Err(err) => return Err(err).context("undo failed"),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let body = serde_json::json!({
            "summary": summary,
            "undone": undone,
            "history": session.history(),
        });
        render::write_json(&mut out, &body)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render::render_summary(&summary))?;
        if !undone.is_empty() {
            writeln!(out, "Undone:")?;
            for result in &undone {
                writeln!(out, "  {}", render::render_move(result))?;
            }
        }
        let history = session.history();
        if !history.is_empty() {
            writeln!(out, "History:")?;
            write!(out, "{}", render::render_history(&history))?;
        }
    }

    if summary.failed > 0 {
        bail!("{} of {} files could not be organized", summary.failed, summary.total_processed);
    }
    Ok(())
}

fn merge(into: &mut OrganizeSummary, batch: OrganizeSummary) {
    into.total_processed += batch.total_processed;
    into.successful += batch.successful;
    into.failed += batch.failed;
    into.results.extend(batch.results);
    into.failures.extend(batch.failures);
}

/// Resolve where each candidate file would land, without moving anything.
fn preview(session: &Session, paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let organizer = session.organizer();
    let mut planned = Vec::new();
    for path in paths {
        for file in candidate_files(path)? {
            let category = organizer.classify(&file);
            let dir = organizer.category_dir(&category);
            let to = match file.file_name() {
                Some(name) => dir.join(name),
                None => dir,
            };
            planned.push(MoveResult {
                success: false,
                from: file,
                to,
                category: Some(category),
            });
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        render::write_json(&mut out, &planned)?;
        writeln!(out)?;
    } else {
        for result in &planned {
            writeln!(out, "  {}", render::render_move(result))?;
        }
        writeln!(out, "{} files would be moved", planned.len())?;
    }
    Ok(())
}

fn candidate_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("cannot read {}", path.display()))? {
        let entry = entry?;
        if reclaim_core::scanner::walk::is_hidden(&entry.file_name()) {
            continue;
        }
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
