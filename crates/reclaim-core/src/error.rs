/// Error taxonomy for every core operation.
///
/// Structural errors on the top-level target (missing root, wrong entry kind)
/// surface unmodified. Per-item failures inside a bulk walk or bulk organize
/// are logged and counted by the caller instead of being returned here.
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was required but the path is something else.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A regular file was required but the path is a directory.
    #[error("is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    /// A scan is already running on this scanner instance.
    #[error("a scan is already in progress")]
    AlreadyScanning,

    /// `undo` was called with an empty history.
    #[error("nothing to undo")]
    NoHistory,

    /// The scan was cancelled by the caller.
    #[error("scan cancelled")]
    Cancelled,

    /// Permission or device failure while reading, hashing, or moving.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an `io::Error` with the path it occurred on.
    ///
    /// `NotFound` I/O errors are promoted to [`Error::NotFound`] so callers
    /// can match on one variant regardless of which syscall noticed it.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
