//! File content collection.
//!
//! Every file entry from the walk becomes exactly one [`FileRecord`]. Reads
//! never abort the run: undecodable bytes are replaced with U+FFFD and files
//! that cannot be read at all carry a placeholder instead of content.

use std::fs;
use std::io;
use std::path::Path;

use crate::walker::{relative_path, WalkEntry};

/// Prefix of the placeholder stored for files that could not be read.
pub const UNREADABLE_PLACEHOLDER: &str = "[llmify: unreadable file";

/// Text decoded from raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossyText {
    pub text: String,
    /// Number of bytes read.
    pub byte_length: u64,
    /// Whether any invalid sequence was replaced.
    pub had_replacements: bool,
}

/// Decode bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_owned(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

/// Read a whole file and decode it lossily.
///
/// Only regular files (or links to them) are opened; FIFOs, sockets and
/// device nodes fail with [`io::ErrorKind::InvalidInput`] since opening them
/// can block. The handle is closed before returning on every path.
pub fn read_text_lossy(path: &Path) -> io::Result<LossyText> {
    if !fs::metadata(path)?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    let bytes = fs::read(path)?;
    let (text, had_replacements) = decode_lossy(&bytes);
    Ok(LossyText {
        text,
        byte_length: bytes.len() as u64,
        had_replacements,
    })
}

/// One collected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the scan root, `/`-separated.
    pub relative_path: String,
    /// Decoded content, or a placeholder when the file was unreadable.
    pub content: String,
    /// Bytes read from disk (0 when unreadable).
    pub byte_length: u64,
    pub had_replacements: bool,
    /// Why the file could not be read, if it could not.
    pub read_error: Option<String>,
    pub token_count: Option<usize>,
}

impl FileRecord {
    /// Record for a successfully read file.
    pub fn from_text(relative_path: impl Into<String>, text: LossyText) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: text.text,
            byte_length: text.byte_length,
            had_replacements: text.had_replacements,
            read_error: None,
            token_count: None,
        }
    }

    /// Placeholder record for a file that could not be read.
    pub fn unreadable(relative_path: impl Into<String>, error: &io::Error) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: format!("{}: {}]", UNREADABLE_PLACEHOLDER, error),
            byte_length: 0,
            had_replacements: false,
            read_error: Some(error.to_string()),
            token_count: None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        self.read_error.is_some()
    }
}

/// Read one walked file into a record.
pub fn collect_file(root: &Path, path: &Path) -> FileRecord {
    let relative = relative_path(root, path);
    match read_text_lossy(path) {
        Ok(text) => {
            if text.had_replacements {
                log::debug!("Replaced undecodable bytes in {}", relative);
            }
            FileRecord::from_text(relative, text)
        }
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            FileRecord::unreadable(relative, &e)
        }
    }
}

/// Collect every file entry, in walk order.
pub fn collect_files(root: &Path, entries: &[WalkEntry]) -> Vec<FileRecord> {
    entries
        .iter()
        .filter(|e| e.depth > 0 && e.is_file())
        .map(|e| collect_file(root, &e.path))
        .collect()
}
