//! Directory traversal and candidate filtering for the indexer.

use crate::config::normalize_extension;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file that passed every selection predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path as produced by the directory walk (root-prefixed).
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated on every platform.
    pub relative_path: String,
    /// Lowercase extension without the leading dot.
    pub extension: String,
    /// Size in bytes observed during selection.
    pub size: u64,
}

impl FileCandidate {
    /// Final path component, e.g. `Program.cs`.
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Predicates a file must satisfy to be indexed.
#[derive(Debug, Clone)]
pub struct SelectionRules {
    extensions: BTreeSet<String>,
    ignored: Vec<Vec<String>>,
    max_file_bytes: u64,
}

impl SelectionRules {
    /// Build rules from raw extension and ignored-directory lists.
    ///
    /// Extensions are compared case-insensitively; ignored entries containing `/` match a
    /// run of consecutive path segments.
    pub fn new<E, I>(extensions: E, ignored_dirs: I, max_file_bytes: u64) -> Self
    where
        E: IntoIterator<Item = String>,
        I: IntoIterator<Item = String>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(&ext))
            .filter(|ext| !ext.is_empty())
            .collect();
        let ignored = ignored_dirs
            .into_iter()
            .map(|entry| {
                entry
                    .split('/')
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|segments| !segments.is_empty())
            .collect();
        Self {
            extensions,
            ignored,
            max_file_bytes,
        }
    }

    /// Whether the extension (with or without a dot) is on the allow-list.
    pub fn extension_allowed(&self, extension: &str) -> bool {
        self.extensions.contains(&normalize_extension(extension))
    }

    /// Whether any segment run of `relative` matches an ignored directory entry.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        self.ignored.iter().any(|pattern| {
            segments
                .windows(pattern.len())
                .any(|window| window.iter().zip(pattern).all(|(a, b)| a == b))
        })
    }

    /// Whether a file of `size` bytes is within the cutoff (inclusive).
    pub fn size_allowed(&self, size: u64) -> bool {
        size <= self.max_file_bytes
    }

    /// Apply every predicate to a root-relative path and its size.
    pub fn accepts(&self, relative: &Path, size: u64) -> bool {
        let extension_ok = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extension_allowed(ext));
        extension_ok && !self.is_ignored(relative) && self.size_allowed(size)
    }
}

/// Lazily walk `root` and yield every file accepted by `rules`.
///
/// Ignored directories are pruned without descending into them. Entries that cannot be
/// read or stat'ed are skipped silently; the walk is sorted by file name so repeated runs
/// over an unchanged tree see the same order.
pub fn select_files<'a>(
    root: &'a Path,
    rules: &'a SelectionRules,
) -> impl Iterator<Item = FileCandidate> + 'a {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !is_pruned(entry, root, rules))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(move |entry| candidate_from_entry(&entry, root, rules))
}

fn is_pruned(entry: &DirEntry, root: &Path, rules: &SelectionRules) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .path()
        .strip_prefix(root)
        .map(|relative| rules.is_ignored(relative))
        .unwrap_or(false)
}

fn candidate_from_entry(
    entry: &DirEntry,
    root: &Path,
    rules: &SelectionRules,
) -> Option<FileCandidate> {
    let relative = entry.path().strip_prefix(root).ok()?;
    let extension = relative.extension()?.to_str()?;
    if !rules.extension_allowed(extension) || rules.is_ignored(relative) {
        return None;
    }

    // The file may have vanished since it was listed.
    let size = match entry.metadata() {
        Ok(metadata) => metadata.len(),
        Err(err) => {
            tracing::debug!(path = %entry.path().display(), error = %err, "Skipping file without metadata");
            return None;
        }
    };
    if !rules.size_allowed(size) {
        tracing::debug!(
            path = %entry.path().display(),
            size,
            max = rules.max_file_bytes,
            "Skipping oversized file"
        );
        return None;
    }

    Some(FileCandidate {
        path: entry.path().to_path_buf(),
        relative_path: to_slash_path(relative),
        extension: normalize_extension(extension),
        size,
    })
}

fn to_slash_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
