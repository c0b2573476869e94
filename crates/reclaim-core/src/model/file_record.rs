/// A single regular file observed during a walk.
///
/// Records are created once by the walker, optionally enriched with a content
/// hash by the hash phase, and never mutated after that.
use compact_str::CompactString;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 128-bit XXH3 digest of a file's full byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub u128);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Full path as yielded by the walker (root-relative paths stay relative).
    pub path: PathBuf,
    /// Logical size in bytes.
    pub size: u64,
    /// Last-modified time. `None` when the platform cannot report it.
    pub modified: Option<SystemTime>,
    /// Lowercased extension including the leading dot, or empty.
    pub extension: CompactString,
    /// Present only for files inside the hashable size range that hashed cleanly.
    pub content_hash: Option<ContentHash>,
}

impl FileRecord {
    pub fn new(path: PathBuf, size: u64, modified: Option<SystemTime>) -> Self {
        let extension = extension_of(&path);
        Self {
            path,
            size,
            modified,
            extension,
            content_hash: None,
        }
    }

    /// Return a copy carrying `hash`.
    pub fn with_hash(self, hash: ContentHash) -> Self {
        Self {
            content_hash: Some(hash),
            ..self
        }
    }

    /// File name component, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lowercased extension of `path` with a leading dot (`".pdf"`), or an empty
/// string when the name has no extension.
pub fn extension_of(path: &Path) -> CompactString {
    match path.extension() {
        Some(ext) => {
            let mut out = CompactString::new(".");
            out.push_str(&ext.to_string_lossy().to_lowercase());
            out
        }
        None => CompactString::default(),
    }
}
