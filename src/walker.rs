//! Deterministic directory traversal.
//!
//! Uses the `ignore` crate's walker with its gitignore/hidden-file filters
//! switched off: only the configured [`IgnoreRuleSet`] decides what is
//! skipped. The same walk feeds both the tree renderer and the content
//! collector, so the two always agree on which files exist.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::config::IgnoreRuleSet;

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Entry from directory walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path to the entry.
    pub path: PathBuf,
    /// Depth from root (root = 0).
    pub depth: usize,
    /// Whether this entry is listed as a directory.
    pub is_dir: bool,
    /// Size in bytes from metadata (files only, when available).
    pub size: Option<u64>,
}

impl WalkEntry {
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// Bare name of the entry.
    pub fn name(&self) -> String {
        entry_name(&self.path)
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Path of `path` relative to `root`, components joined with `/`.
///
/// The separator is fixed so output is identical across platforms.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// Links are not followed; one pointing at a directory is shown as an empty directory.
fn listed_as_dir(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_dir() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_dir(),
        _ => false,
    }
}

/// Sibling order: case-insensitive name, ties broken by the raw name.
pub fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    let (a, b) = (a.to_string_lossy(), b.to_string_lossy());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// Walk `root` depth-first in pre-order, pruning ignored entries.
///
/// The root itself is the first entry (depth 0) and is never filtered.
/// Ignored directories are not descended. Unreadable directories are
/// logged and skipped.
///
/// # Examples
///
/// ```no_run
/// use llmify::config::IgnoreRuleSet;
/// use llmify::walker::walk;
/// use std::path::Path;
///
/// let rules = IgnoreRuleSet::new(["target"], ["*.lock"]).unwrap();
/// for entry in walk(Path::new("."), &rules).unwrap() {
///     println!("{}", entry.path.display());
/// }
/// ```
pub fn walk(root: &Path, rules: &IgnoreRuleSet) -> Result<Vec<WalkEntry>, WalkError> {
    let metadata = match root.metadata() {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(WalkError::NotFound {
                path: root.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(WalkError::Io {
                path: root.to_path_buf(),
                source,
            })
        }
    };
    if !metadata.is_dir() {
        return Err(WalkError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let filter_rules = rules.clone();
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(compare_names)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if listed_as_dir(entry) {
                !filter_rules.is_dir_ignored(&name)
            } else {
                !filter_rules.is_file_ignored(&name)
            }
        });

    let mut entries = Vec::new();
    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path().to_path_buf();
                let is_dir = listed_as_dir(&entry);

                let size = if is_dir {
                    None
                } else {
                    entry.metadata().ok().map(|m| m.len())
                };

                entries.push(WalkEntry {
                    path,
                    depth: entry.depth(),
                    is_dir,
                    size,
                });
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry during walk: {}", e);
            }
        }
    }

    log::debug!(
        "Walked {} entries under {}",
        entries.len(),
        root.display()
    );
    Ok(entries)
}
