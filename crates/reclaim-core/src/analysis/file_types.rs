/// File type categorisation based on file extensions.
///
/// One static extension table feeds two consumers: the organizer's fallback
/// rule (which folder a file lands in) and the report's category rollup.
/// The sets are disjoint, so lookup order does not matter.
use serde::Serialize;

/// Broad file type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FileCategory {
    Documents,
    Images,
    Audio,
    Video,
    Archives,
    Code,
    Executables,
    Other,
}

impl FileCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Documents => "Documents",
            Self::Images => "Images",
            Self::Audio => "Audio",
            Self::Video => "Video",
            Self::Archives => "Archives",
            Self::Code => "Code",
            Self::Executables => "Executables",
            Self::Other => "Other",
        }
    }

    /// Folder the organizer files this category under.
    pub fn folder_name(self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Images => "images",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Archives => "archives",
            Self::Code => "code",
            Self::Executables => "executables",
            Self::Other => "outros",
        }
    }
}

/// Categorise an extension, with or without its leading dot.
///
/// Zero-heap-allocation hot path: the extension is lowercased into a
/// fixed-size stack buffer. Anything longer than 16 bytes is `Other`.
pub fn categorise_extension(ext: &str) -> FileCategory {
    let bytes = ext.strip_prefix('.').unwrap_or(ext).as_bytes();
    if bytes.len() > 16 {
        return FileCategory::Other;
    }

    let mut lower = [0u8; 16];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = match std::str::from_utf8(&lower[..bytes.len()]) {
        Ok(s) => s,
        Err(_) => return FileCategory::Other,
    };

    match lower_str {
        "pdf" | "doc" | "docx" | "txt" | "rtf" | "odt" | "ods" | "odp" | "xls" | "xlsx"
        | "ppt" | "pptx" | "csv" | "md" | "epub" => FileCategory::Documents,
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "tiff" | "tif" | "ico"
        | "heic" | "heif" | "psd" | "raw" => FileCategory::Images,
        "mp3" | "wav" | "ogg" | "flac" | "aac" | "m4a" | "wma" | "opus" => FileCategory::Audio,
        "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg" | "3gp" => {
            FileCategory::Video
        }
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" | "xz" | "zst" | "iso" => FileCategory::Archives,
        "js" | "ts" | "jsx" | "tsx" | "py" | "java" | "c" | "cpp" | "h" | "hpp" | "cs" | "php"
        | "rs" | "go" | "rb" | "html" | "css" | "scss" | "json" | "xml" | "yml" | "yaml"
        | "toml" | "sql" | "sh" => FileCategory::Code,
        "exe" | "msi" | "app" | "dmg" | "deb" | "rpm" | "appimage" => FileCategory::Executables,
        _ => FileCategory::Other,
    }
}

/// Scratch-file extensions reported separately by the scanner.
pub fn is_temporary_extension(ext: &str) -> bool {
    let bare = ext.strip_prefix('.').unwrap_or(ext);
    ["tmp", "temp", "log"]
        .iter()
        .any(|t| bare.eq_ignore_ascii_case(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorise_known_image_extensions() {
        for ext in &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "heic"] {
            assert_eq!(
                categorise_extension(ext),
                FileCategory::Images,
                "expected Images for .{ext}"
            );
        }
    }

    #[test]
    fn categorise_accepts_leading_dot() {
        assert_eq!(categorise_extension(".pdf"), FileCategory::Documents);
        assert_eq!(categorise_extension(".mp3"), FileCategory::Audio);
        assert_eq!(categorise_extension(".dmg"), FileCategory::Executables);
    }

    #[test]
    fn categorise_unknown_extension_returns_other() {
        assert_eq!(categorise_extension("xyz"), FileCategory::Other);
        assert_eq!(categorise_extension(""), FileCategory::Other);
        assert_eq!(categorise_extension(".averyveryverylongextension"), FileCategory::Other);
    }

    /// Extension matching must be case-insensitive so "JPG" == "jpg".
    #[test]
    fn categorise_case_insensitive() {
        assert_eq!(categorise_extension("JPG"), FileCategory::Images);
        assert_eq!(categorise_extension(".ZIP"), FileCategory::Archives);
        assert_eq!(categorise_extension("Exe"), FileCategory::Executables);
    }

    #[test]
    fn catch_all_folder_is_outros() {
        assert_eq!(FileCategory::Other.folder_name(), "outros");
        assert_eq!(FileCategory::Documents.folder_name(), "documents");
    }

    #[test]
    fn temporary_extensions() {
        assert!(is_temporary_extension(".tmp"));
        assert!(is_temporary_extension(".LOG"));
        assert!(is_temporary_extension("temp"));
        assert!(!is_temporary_extension(".txt"));
        assert!(!is_temporary_extension(""));
    }
}
