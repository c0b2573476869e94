/// Collision-safe file relocation.
///
/// The categorize step never overwrites: a taken name gets a numeric
/// disambiguator. Only the undo step replaces an existing file, and only at
/// the original path it is restoring.
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `EXDEV` / `ERROR_NOT_SAME_DEVICE`: rename across filesystems.
#[cfg(unix)]
const CROSS_DEVICE: i32 = 18;
#[cfg(windows)]
const CROSS_DEVICE: i32 = 17;
#[cfg(not(any(unix, windows)))]
const CROSS_DEVICE: i32 = -1;

/// Anything occupying `path`, including a dangling symlink.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// `name.ext` with ` (n)` inserted before the extension.
pub fn disambiguated_name(file_name: &Path, n: u32) -> OsString {
    let stem = file_name.file_stem().unwrap_or(file_name.as_os_str());
    let mut out = OsString::from(stem);
    out.push(format!(" ({n})"));
    if let Some(ext) = file_name.extension() {
        out.push(".");
        out.push(ext);
    }
    out
}

/// First free path in `dir` for `file_name`: the name itself, then
/// `name (1).ext`, `name (2).ext`, and so on.
pub fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dir.join(file_name);
    if !occupied(&candidate) {
        return candidate;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(disambiguated_name(file_name, n));
        if !occupied(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Move `from` to `to`, replacing `to` if it exists.
///
/// Tries a rename first. Across filesystems it copies, carries over the
/// modification time, then removes the source; if removing the source fails
/// the copy is deleted again so the caller sees either a full move or none.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.raw_os_error() == Some(CROSS_DEVICE) => {
            debug!("Cross-device move, copying {} -> {}", from.display(), to.display());
            copy_then_remove(from, to)
        }
        Err(err) => Err(err),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let modified = fs::metadata(from)?.modified().ok();
    if let Err(err) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(err);
    }
    if let Some(mtime) = modified {
        if let Ok(f) = File::options().write(true).open(to) {
            let _ = f.set_modified(mtime);
        }
    }
    if let Err(err) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(err);
    }
    Ok(())
}
