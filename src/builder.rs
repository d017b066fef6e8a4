//! Fluent builder API for llmify.
//!
//! Provides both function composition and builder-style APIs for turning a
//! directory into an [`ExtractionResult`].

use std::path::{Path, PathBuf};

use crate::collector::{collect_files, FileRecord};
use crate::config::IgnoreRuleSet;
use crate::output::{format_output, OutputError, OutputFormat};
use crate::tokens::{CountTokens, TokenCounter};
use crate::tree::{build_tree, render_tree, RenderOptions};
use crate::walker::{walk, WalkError};

/// Everything extracted from one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Scanned root directory.
    pub root: PathBuf,
    /// Rendered directory listing.
    pub tree_text: String,
    /// File records in walk order.
    pub files: Vec<FileRecord>,
    /// Sum of per-file token counts, when counted.
    pub total_token_count: Option<usize>,
}

impl ExtractionResult {
    /// Count tokens for every file.
    ///
    /// All-or-nothing: if any count fails, no counts are kept and `false`
    /// is returned.
    pub fn annotate_tokens(&mut self, counter: &dyn CountTokens) -> bool {
        let counts: Result<Vec<usize>, _> =
            self.files.iter().map(|f| counter.count(&f.content)).collect();

        match counts {
            Ok(counts) => {
                for (file, count) in self.files.iter_mut().zip(&counts) {
                    file.token_count = Some(*count);
                }
                self.total_token_count = Some(counts.iter().sum());
                true
            }
            Err(e) => {
                log::warn!("Token counts omitted: {}", e);
                self.clear_tokens();
                false
            }
        }
    }

    fn clear_tokens(&mut self) {
        for file in &mut self.files {
            file.token_count = None;
        }
        self.total_token_count = None;
    }

    pub fn is_tokenized(&self) -> bool {
        self.total_token_count.is_some()
    }

    /// Relative paths of all collected files, in order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.relative_path.as_str())
    }
}

/// Builder for extracting a codebase.
///
/// # Examples
///
/// ```no_run
/// use llmify::builder::Extractor;
/// use llmify::config::IgnoreRuleSet;
///
/// let rules = IgnoreRuleSet::new(["target"], ["*.lock"]).unwrap();
/// let result = Extractor::new("./project", rules)
///     .show_sizes(true)
///     .extract()
///     .unwrap();
/// println!("{} files", result.files.len());
/// ```
pub struct Extractor {
    root: PathBuf,
    rules: IgnoreRuleSet,
    render_options: RenderOptions,
    skip: Option<PathBuf>,
}

impl Extractor {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>, rules: IgnoreRuleSet) -> Self {
        Self {
            root: root.into(),
            rules,
            render_options: RenderOptions::minimal(),
            skip: None,
        }
    }

    /// Show file sizes in the rendered tree.
    pub fn show_sizes(mut self, show: bool) -> Self {
        self.render_options.show_size = show;
        self
    }

    /// Leave one file out of both the tree and the records.
    ///
    /// Used for the output file, so that writing into the scanned directory
    /// does not feed the previous run into the next one.
    pub fn skip_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip = Some(path.into());
        self
    }

    /// Walk once, then render the tree and collect file contents.
    pub fn extract(self) -> Result<ExtractionResult, WalkError> {
        // Canonical so that "." still gets a real name on the root line
        let root = self.root.canonicalize().unwrap_or(self.root);
        let mut entries = walk(&root, &self.rules)?;

        if let Some(skip) = self.skip.as_deref().and_then(canonical_file_path) {
            let before = entries.len();
            entries.retain(|e| e.is_dir || e.path != skip);
            if entries.len() < before {
                log::info!("Leaving {} out of the extraction", skip.display());
            }
        }

        let tree = build_tree(&root, &entries);
        let tree_text = render_tree(&tree, &self.render_options);
        let files = collect_files(&root, &entries);

        log::info!(
            "Extracted {} files from {}",
            files.len(),
            root.display()
        );

        Ok(ExtractionResult {
            root,
            tree_text,
            files,
            total_token_count: None,
        })
    }
}

// Canonical path of a file that may not exist yet.
fn canonical_file_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.canonicalize().ok().map(|p| p.join(name))
}

/// Extract `target_dir` with the given rules and default rendering.
pub fn extract(target_dir: &Path, rules: &IgnoreRuleSet) -> Result<ExtractionResult, WalkError> {
    Extractor::new(target_dir, rules.clone()).extract()
}

/// Annotate with the default token counter when `tokenize` is set, then format.
pub fn serialize(
    result: &mut ExtractionResult,
    format: OutputFormat,
    tokenize: bool,
) -> Result<String, OutputError> {
    if tokenize {
        result.annotate_tokens(&TokenCounter::default());
    }
    format_output(result, format)
}
