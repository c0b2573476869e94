/// Organizer — rule-based relocation of files into category folders with a
/// last-in-first-out undo history.
///
/// All category folders live under one destination root chosen at
/// construction. Moves are recorded only after they succeed, and a failed undo
/// puts the popped entry back, so the history never loses an operation.
pub mod history;
pub mod relocate;
pub mod rules;

pub use history::{HistoryStack, MoveOperation};
pub use rules::{default_rules, Category, ClassificationRule};

use crate::error::{Error, Result};
use crate::model::extension_of;
use crate::scanner::walk::is_hidden;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of one relocation (or one undo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    pub success: bool,
    pub from: PathBuf,
    pub to: PathBuf,
    /// Bucket the file was filed under; `None` for undo results.
    pub category: Option<Category>,
}

/// A file that could not be organized during a directory batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizeFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate result of [`Organizer::organize_directory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeSummary {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<MoveResult>,
    pub failures: Vec<OrganizeFailure>,
}

pub struct Organizer {
    destination_root: PathBuf,
    rules: Vec<Box<dyn ClassificationRule>>,
    history: Mutex<HistoryStack>,
}

impl Organizer {
    /// Organizer filing into `destination_root` with the built-in rule chain.
    pub fn new(destination_root: impl Into<PathBuf>) -> Self {
        Self::with_rules(destination_root, default_rules())
    }

    /// Organizer with a caller-supplied, ordered rule chain.
    pub fn with_rules(
        destination_root: impl Into<PathBuf>,
        rules: Vec<Box<dyn ClassificationRule>>,
    ) -> Self {
        Self {
            destination_root: destination_root.into(),
            rules,
            history: Mutex::new(HistoryStack::default()),
        }
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Category `path` would be filed under. Touches nothing on disk.
    pub fn classify(&self, path: &Path) -> Category {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        rules::classify_with(&self.rules, &file_name, &extension_of(path))
    }

    /// Directory `category` resolves to under the destination root.
    pub fn category_dir(&self, category: &Category) -> PathBuf {
        self.destination_root.join(category.relative_dir())
    }

    /// Move one regular file into its category folder.
    ///
    /// A file that already sits in its category folder is reported as moved
    /// onto itself and nothing is recorded.
    pub fn organize_file(&self, path: impl AsRef<Path>) -> Result<MoveResult> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if meta.is_dir() {
            return Err(Error::IsDirectory(path.to_path_buf()));
        }
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))?;

        let category = self.classify(path);
        let dir = self.category_dir(&category);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        if already_in(path, &dir) {
            return Ok(MoveResult {
                success: true,
                from: path.to_path_buf(),
                to: path.to_path_buf(),
                category: Some(category),
            });
        }

        // Hold the history lock across the move so the record and the
        // filesystem change are observed together.
        let mut history = self.history.lock();
        let destination = relocate::unique_destination(&dir, Path::new(file_name));
        relocate::move_file(path, &destination).map_err(|e| Error::io(path, e))?;
        history.push(MoveOperation::new(path.to_path_buf(), destination.clone()));

        info!(
            "Organized {} -> {} [{}]",
            path.display(),
            destination.display(),
            category
        );
        Ok(MoveResult {
            success: true,
            from: path.to_path_buf(),
            to: destination,
            category: Some(category),
        })
    }

    /// Organize every direct-child regular file of `dir` (non-recursive).
    ///
    /// Hidden files are left alone. Per-file failures are collected in the
    /// summary and never abort the batch.
    pub fn organize_directory(&self, dir: impl AsRef<Path>) -> Result<OrganizeSummary> {
        let dir = dir.as_ref();
        let meta = fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let mut summary = OrganizeSummary::default();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("Error reading entry in {}: {err}", dir.display());
                    summary.failures.push(OrganizeFailure {
                        path: dir.to_path_buf(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if is_hidden(&entry.file_name()) {
                continue;
            }
            let path = entry.path();
            match fs::metadata(&path) {
                Ok(m) if m.is_file() => files.push(path),
                Ok(_) => {}
                Err(err) => {
                    warn!("Error reading metadata for {}: {err}", path.display());
                    summary.failures.push(OrganizeFailure {
                        path,
                        error: err.to_string(),
                    });
                }
            }
        }
        files.sort();

        for path in files {
            match self.organize_file(&path) {
                Ok(result) => summary.results.push(result),
                Err(err) => {
                    warn!("Failed to organize {}: {err}", path.display());
                    summary.failures.push(OrganizeFailure {
                        path,
                        error: err.to_string(),
                    });
                }
            }
        }

        summary.successful = summary.results.len();
        summary.failed = summary.failures.len();
        summary.total_processed = summary.successful + summary.failed;
        info!(
            "Organized {}: {} moved, {} failed",
            dir.display(),
            summary.successful,
            summary.failed
        );
        Ok(summary)
    }

    /// Reverse the most recent move.
    ///
    /// Fails with `NoHistory` on an empty stack. On any other failure the
    /// popped operation is pushed back so the undo can be retried.
    pub fn undo(&self) -> Result<MoveResult> {
        let mut history = self.history.lock();
        let op = history.pop().ok_or(Error::NoHistory)?;

        match restore(&op) {
            Ok(()) => {
                info!(
                    "Undid move {} -> {}",
                    op.destination.display(),
                    op.source.display()
                );
                Ok(MoveResult {
                    success: true,
                    from: op.destination,
                    to: op.source,
                    category: None,
                })
            }
            Err(err) => {
                warn!("Undo failed, keeping history entry: {err}");
                history.push(op);
                Err(err)
            }
        }
    }

    /// Chronological copy of the history.
    pub fn history(&self) -> Vec<MoveOperation> {
        self.history.lock().snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

/// Put the file at `op.destination` back at `op.source`.
fn restore(op: &MoveOperation) -> Result<()> {
    if fs::symlink_metadata(&op.destination).is_err() {
        return Err(Error::NotFound(op.destination.clone()));
    }
    if let Some(parent) = op.source.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    relocate::move_file(&op.destination, &op.source).map_err(|e| Error::io(&op.destination, e))
}

/// `true` when `path`'s parent is `dir` itself.
fn already_in(path: &Path, dir: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match (fs::canonicalize(parent), fs::canonicalize(dir)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
