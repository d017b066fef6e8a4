//! Output formatting for llmify.
//!
//! Turns an [`ExtractionResult`] into either the flat text layout or a
//! pretty-printed JSON document, and writes it to a file or stdout.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::builder::ExtractionResult;
use crate::collector::FileRecord;
use crate::tree::format_number;

/// Target meaning "write to stdout".
pub const STDOUT_TARGET: &str = "-";

/// Errors that can occur during output formatting.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cannot write output to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Section markers with raw file contents (default).
    #[default]
    Text,
    /// JSON for programmatic access.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

/// Format an extraction result.
///
/// Token counts appear only when the result has been annotated.
pub fn format_output(result: &ExtractionResult, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Text => Ok(format_output_text(result)),
        OutputFormat::Json => format_output_json(result),
    }
}

// ============================================================================
// Text Formatting
// ============================================================================

const LISTING_START: &str = "=== Directory Listing ===";
const LISTING_END: &str = "=== End of Directory Listing ===";
const SUMMARY_START: &str = "=== Token Summary ===";
const FILE_HEADER: &str = "### FILE: ";
// Follows every file's content as read; a trailing newline is never added or removed.
const FILE_SEPARATOR: &str = "\n\n";

fn format_output_text(result: &ExtractionResult) -> String {
    let content_len: usize = result.files.iter().map(|f| f.content.len()).sum();
    let mut output = String::with_capacity(result.tree_text.len() + content_len + 256);

    output.push_str(LISTING_START);
    output.push_str("\n\n");
    push_line_terminated(&mut output, &result.tree_text);
    output.push('\n');
    output.push_str(LISTING_END);
    output.push_str("\n\n");

    for file in &result.files {
        output.push_str(&file_header(file));
        output.push('\n');
        output.push_str(&file.content);
        output.push_str(FILE_SEPARATOR);
    }

    if let Some(total) = result.total_token_count {
        output.push_str(&format_summary_text(result.files.len(), total));
    }

    output
}

fn file_header(file: &FileRecord) -> String {
    match file.token_count {
        Some(tokens) => format!("{}{} [{} tokens]", FILE_HEADER, file.relative_path, tokens),
        None => format!("{}{}", FILE_HEADER, file.relative_path),
    }
}

fn push_line_terminated(output: &mut String, text: &str) {
    output.push_str(text);
    if !text.ends_with('\n') {
        output.push('\n');
    }
}

fn format_summary_text(file_count: usize, total: usize) -> String {
    format!(
        "{}\nFiles: {}\nTotal tokens: {}\n",
        SUMMARY_START,
        format_number(file_count),
        format_number(total)
    )
}

// ============================================================================
// JSON Formatting
// ============================================================================

#[derive(Serialize)]
struct JsonOutput<'a> {
    tree: &'a str,
    files: Vec<JsonFile<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_token_count: Option<usize>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: &'a str,
    content: &'a str,
    byte_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_count: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    had_replacements: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    read_error: Option<&'a str>,
}

impl<'a> From<&'a FileRecord> for JsonFile<'a> {
    fn from(file: &'a FileRecord) -> Self {
        Self {
            path: &file.relative_path,
            content: &file.content,
            byte_length: file.byte_length,
            token_count: file.token_count,
            had_replacements: file.had_replacements,
            read_error: file.read_error.as_deref(),
        }
    }
}

fn format_output_json(result: &ExtractionResult) -> Result<String, OutputError> {
    let output = JsonOutput {
        tree: &result.tree_text,
        files: result.files.iter().map(JsonFile::from).collect(),
        total_token_count: result.total_token_count,
    };
    let mut json = serde_json::to_string_pretty(&output)?;
    json.push('\n');
    Ok(json)
}

// ============================================================================
// Writing
// ============================================================================

/// Write rendered output to `target`; [`STDOUT_TARGET`] writes to stdout.
pub fn write_output(target: &Path, rendered: &str) -> Result<(), OutputError> {
    let write_error = |source| OutputError::Write {
        path: target.to_path_buf(),
        source,
    };

    if target == Path::new(STDOUT_TARGET) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(rendered.as_bytes()).map_err(write_error)?;
        handle.flush().map_err(write_error)
    } else {
        fs::write(target, rendered).map_err(write_error)
    }
}
