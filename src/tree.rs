//! File tree representation and rendering.
//!
//! Provides types for representing the filtered directory structure and
//! functions for rendering it with box-drawing characters.

use std::path::{Path, PathBuf};

use crate::config::IgnoreRuleSet;
use crate::walker::{relative_path, walk, WalkEntry, WalkError};

/// The type of a filesystem node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File { size: u64 },
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self, NodeKind::Directory)
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File { .. })
    }
}

/// A node in the file tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or directory name (not full path).
    pub name: String,
    /// Full path on disk.
    pub path: PathBuf,
    /// Type of node (file or directory).
    pub kind: NodeKind,
    /// Child nodes in walk order (empty for files).
    children: Vec<FileNode>,
}

impl FileNode {
    /// Create a new directory node.
    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
        }
    }

    /// Create a new file node.
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File { size },
            children: Vec::new(),
        }
    }

    /// Check if this is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Add a child node. Only valid for directories.
    pub fn add_child(&mut self, child: FileNode) {
        self.children.push(child);
    }

    /// Get child nodes.
    pub fn children(&self) -> &[FileNode] {
        &self.children
    }

    /// Get file size if this is a file.
    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::File { size } => Some(*size),
            NodeKind::Directory => None,
        }
    }

    /// Relative paths (`/`-separated) of every file below this node, in order.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_file_paths(&self.path, &mut paths);
        paths
    }

    fn collect_file_paths(&self, root: &Path, out: &mut Vec<String>) {
        for child in &self.children {
            if child.is_file() {
                out.push(relative_path(root, &child.path));
            } else {
                child.collect_file_paths(root, out);
            }
        }
    }
}

/// Label used for the root line: the directory's own name.
pub fn root_label(root: &Path) -> String {
    root.file_name().map_or_else(
        || root.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Fold pre-order walk entries into a tree rooted at `root`.
///
/// Entries must come from [`walk`]; child order is walk order.
pub fn build_tree(root: &Path, entries: &[WalkEntry]) -> FileNode {
    let mut tree = FileNode::directory(root_label(root), root);
    // Directories still receiving children, outermost first; `open[i]` is at depth i + 1.
    let mut open: Vec<FileNode> = Vec::new();

    for entry in entries.iter().filter(|e| e.depth > 0) {
        while open.len() >= entry.depth {
            close_last(&mut tree, &mut open);
        }

        if entry.is_dir {
            open.push(FileNode::directory(entry.name(), &entry.path));
        } else {
            let node = FileNode::file(entry.name(), &entry.path, entry.size.unwrap_or(0));
            match open.last_mut() {
                Some(parent) => parent.add_child(node),
                None => tree.add_child(node),
            }
        }
    }

    while !open.is_empty() {
        close_last(&mut tree, &mut open);
    }

    tree
}

fn close_last(tree: &mut FileNode, open: &mut Vec<FileNode>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.add_child(done),
            None => tree.add_child(done),
        }
    }
}

/// Options for rendering the tree.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Show file sizes.
    pub show_size: bool,
}

impl RenderOptions {
    /// Create options with file sizes enabled.
    pub fn with_sizes() -> Self {
        Self { show_size: true }
    }

    /// Create minimal options (no metadata).
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Box-drawing characters for tree rendering.
const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";

/// Render a file tree to a string with box-drawing characters.
///
/// The first line is the root's name; every nested level adds four columns
/// of prefix. Directories end with `/`.
///
/// # Examples
///
/// ```
/// use llmify::tree::{FileNode, RenderOptions, render_tree};
///
/// let mut root = FileNode::directory("project", "project");
/// root.add_child(FileNode::file("main.rs", "project/main.rs", 1024));
///
/// let output = render_tree(&root, &RenderOptions::minimal());
/// assert_eq!(output, "project/\n└── main.rs\n");
/// ```
pub fn render_tree(root: &FileNode, options: &RenderOptions) -> String {
    // Pre-allocate for typical tree size
    let mut output = String::with_capacity(4096);
    render_node(&mut output, root, "", true, true, options);
    output
}

fn render_node(
    output: &mut String,
    node: &FileNode,
    prefix: &str,
    is_last: bool,
    is_root: bool,
    options: &RenderOptions,
) {
    let branch = if is_root {
        ""
    } else if is_last {
        LAST_BRANCH
    } else {
        BRANCH
    };

    output.push_str(prefix);
    output.push_str(branch);
    output.push_str(&node.name);

    // Add trailing slash for directories
    if node.is_directory() && !node.name.ends_with('/') {
        output.push('/');
    }

    if options.show_size {
        if let NodeKind::File { size } = &node.kind {
            output.push_str(" [");
            output.push_str(&format_size(*size));
            output.push(']');
        }
    }

    output.push('\n');

    let child_count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == child_count - 1;

        let new_prefix = if is_root {
            String::new()
        } else {
            let continuation = if is_last { SPACE } else { VERTICAL };
            format!("{}{}", prefix, continuation)
        };

        render_node(output, child, &new_prefix, is_last_child, false, options);
    }
}

/// Walk `root` with `rules` and render the resulting tree.
///
/// Reads no file contents.
pub fn render_directory(
    root: &Path,
    rules: &IgnoreRuleSet,
    options: &RenderOptions,
) -> Result<String, WalkError> {
    let entries = walk(root, rules)?;
    Ok(render_tree(&build_tree(root, &entries), options))
}

/// Format file size for display.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{}B", bytes)
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}

/// Format number with thousands separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
