//! Selection entries: relative path plus content handle.

use crate::error::BuildError;
use crate::tree::node::ContentHandle;
use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// One selected file and its position relative to the selection root
#[derive(Debug, Clone)]
pub struct PathEntry {
    segments: Vec<String>,
    pub content: ContentHandle,
}

impl PathEntry {
    /// Create an entry from a `/`-separated relative path such as `folder/b.txt`.
    ///
    /// Backslashes are treated as separators, empty segments are dropped, and every
    /// segment is NFC-normalized.
    pub fn new(relative_path: &str, content: ContentHandle) -> Result<Self, BuildError> {
        let segments = normalize_segments(relative_path, relative_path.split(['/', '\\']))?;
        Ok(Self { segments, content })
    }

    /// Create an entry from already split path segments
    pub fn from_segments(segments: Vec<String>, content: ContentHandle) -> Result<Self, BuildError> {
        let joined = segments.join("/");
        let segments = normalize_segments(&joined, segments.iter().map(String::as_str))?;
        Ok(Self { segments, content })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        // normalize_segments guarantees at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn relative_path(&self) -> String {
        self.segments.join("/")
    }
}

fn normalize_segments<'a>(
    path: &str,
    raw: impl Iterator<Item = &'a str>,
) -> Result<Vec<String>, BuildError> {
    let mut segments = Vec::new();
    for segment in raw {
        if segment.is_empty() {
            continue;
        }
        if segment == "." || segment == ".." {
            return Err(BuildError::InvalidSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
        segments.push(segment.nfc().collect::<String>());
    }
    if segments.is_empty() {
        return Err(BuildError::EmptyPath);
    }
    Ok(segments)
}

/// Collect every file beneath a local file or directory.
///
/// Relative paths start at the selected item's own name, so selecting `/data/folder`
/// yields entries like `folder/b.txt`. Files are visited in file-name order; empty
/// directories and symlinks are skipped.
pub fn collect_local(root: &Path) -> Result<Vec<PathEntry>, BuildError> {
    let walk_error = |path: &Path, message: String| BuildError::Walk {
        path: path.display().to_string(),
        message,
    };

    let canonical = dunce::canonicalize(root).map_err(|e| walk_error(root, e.to_string()))?;
    let base = canonical.parent().unwrap_or(&canonical).to_path_buf();

    let mut entries = Vec::new();
    for item in WalkDir::new(&canonical).sort_by_file_name() {
        let item = item.map_err(|e| walk_error(root, e.to_string()))?;
        if !item.file_type().is_file() {
            continue;
        }

        let path = item.path();
        let relative = path
            .strip_prefix(&base)
            .map_err(|e| walk_error(path, e.to_string()))?;
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let len = item
            .metadata()
            .map_err(|e| walk_error(path, e.to_string()))?
            .len();
        let name = item.file_name().to_string_lossy().into_owned();
        let content = ContentHandle::from_path(name, guess_mime_type(path), path.to_path_buf(), len);
        entries.push(PathEntry::from_segments(segments, content)?);
    }

    Ok(entries)
}

/// Guess a MIME type from the file extension
pub fn guess_mime_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
