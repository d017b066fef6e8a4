//! llmify - Flatten a codebase into a single LLM-ready document.
//!
//! llmify walks a directory tree, renders it as a listing, and appends the
//! contents of every file that the configured ignore rules do not exclude.
//! The result is written as plain text or JSON, optionally with token counts.
//!
//! # Quick Start
//!
//! ```no_run
//! use llmify::builder::{extract, serialize};
//! use llmify::config::resolve_rules;
//! use llmify::output::OutputFormat;
//! use std::path::Path;
//!
//! let root = Path::new("./my-project");
//! let resolved = resolve_rules(root, None).unwrap();
//! let mut result = extract(root, &resolved.rules).unwrap();
//! let text = serialize(&mut result, OutputFormat::Text, true).unwrap();
//!
//! println!("{} files, {:?} tokens", result.files.len(), result.total_token_count);
//! # let _ = text;
//! ```
//!
//! # Modules
//!
//! - [`config`] - Ignore-rule resolution from `llmify_config.yaml`
//! - [`walker`] - Deterministic directory traversal
//! - [`tree`] - File tree representation and rendering
//! - [`collector`] - File reading with lossy decoding
//! - [`tokens`] - Token counting for LLM context budgets
//! - [`output`] - Text and JSON serialization
//! - [`builder`] - Fluent API for extraction

pub mod config;
pub mod walker;
pub mod tree;
pub mod collector;
pub mod tokens;
pub mod output;
pub mod builder;
pub mod errors;

// Re-export key types at crate root for convenience
pub use builder::{extract, serialize, ExtractionResult, Extractor};
pub use collector::FileRecord;
pub use config::{resolve_rules, ConfigError, IgnoreRuleSet, ResolvedRules, Resolver};
pub use errors::LlmifyError;
pub use output::{format_output, write_output, OutputError, OutputFormat};
pub use tree::{FileNode, NodeKind, RenderOptions};
pub use tokens::{count_tokens, CountTokens, Encoding, TokenCounter};
pub use walker::WalkError;
