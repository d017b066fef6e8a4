//! Ignore-rule configuration.
//!
//! Locates an `llmify_config.yaml`, parses its `ignored_dirs` and
//! `ignored_files` lists and compiles them into an [`IgnoreRuleSet`].
//!
//! Candidate locations are tried in [`RESOLUTION_ORDER`]; the first file that
//! exists wins. When none exists the rule set is empty and
//! [`ResolvedRules::no_config_found`] reports it so the caller can warn.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Deserialize;
use thiserror::Error;

/// File name looked up in the target directory and the tool root.
pub const CONFIG_FILE_NAME: &str = "llmify_config.yaml";

/// Environment variable overriding the tool root directory.
pub const TOOL_ROOT_ENV: &str = "LLMIFY_HOME";

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path passed explicitly (`--config`).
    Explicit,
    /// `llmify_config.yaml` inside the directory being extracted.
    TargetDir,
    /// `llmify_config.yaml` inside the tool's own root.
    ToolRoot,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit => write!(f, "explicit"),
            ConfigSource::TargetDir => write!(f, "target directory"),
            ConfigSource::ToolRoot => write!(f, "tool root"),
        }
    }
}

/// Order in which configuration candidates are tried.
pub const RESOLUTION_ORDER: [ConfigSource; 3] = [
    ConfigSource::Explicit,
    ConfigSource::TargetDir,
    ConfigSource::ToolRoot,
];

/// A glob entry in `ignored_files` that failed to compile.
#[derive(Debug, Error)]
#[error("invalid glob pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    source: glob::PatternError,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid ignore rule in {path}: {source}")]
    InvalidPattern {
        path: PathBuf,
        #[source]
        source: PatternError,
    },
}

impl ConfigError {
    /// The configuration file this error refers to.
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::InvalidPattern { path, .. } => path,
        }
    }
}

/// Raw shape of the YAML document.
///
/// Both keys are optional; an explicit `null` reads as an empty list.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub ignored_dirs: Option<Vec<String>>,
    #[serde(default)]
    pub ignored_files: Option<Vec<String>>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_yaml::Value>,
}

/// Compiled ignore rules for one run.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    ignored_dirs: BTreeSet<String>,
    literal_files: BTreeSet<String>,
    file_patterns: Vec<Pattern>,
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

impl IgnoreRuleSet {
    /// Rule set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a rule set from directory names and file names/globs.
    ///
    /// File entries containing `*`, `?` or `[` are compiled as shell-style
    /// globs matched against the bare file name; everything else must match
    /// exactly.
    pub fn new<D, F>(ignored_dirs: D, ignored_files: F) -> Result<Self, PatternError>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let mut rules = Self {
            ignored_dirs: ignored_dirs.into_iter().map(Into::into).collect(),
            ..Default::default()
        };

        for entry in ignored_files {
            let entry: String = entry.into();
            if is_glob(&entry) {
                let pattern = Pattern::new(&entry).map_err(|source| PatternError {
                    pattern: entry.clone(),
                    source,
                })?;
                // Keep the raw entry too: a literal name like "a[1].txt" should still match itself.
                rules.literal_files.insert(entry);
                rules.file_patterns.push(pattern);
            } else {
                rules.literal_files.insert(entry);
            }
        }

        Ok(rules)
    }

    /// Whether a directory with this bare name is pruned.
    pub fn is_dir_ignored(&self, name: &str) -> bool {
        self.ignored_dirs.contains(name)
    }

    /// Whether a file with this bare name is skipped.
    pub fn is_file_ignored(&self, name: &str) -> bool {
        self.literal_files.contains(name) || self.file_patterns.iter().any(|p| p.matches(name))
    }

    pub fn is_empty(&self) -> bool {
        self.ignored_dirs.is_empty() && self.literal_files.is_empty()
    }
}

/// Parse a configuration document from YAML text.
///
/// `origin` is only used to label errors.
pub fn parse_config(content: &str, origin: &Path) -> Result<IgnoreRuleSet, ConfigError> {
    let parse_err = |source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    };

    let document = if content.trim().is_empty() {
        ConfigDocument::default()
    } else {
        match serde_yaml::from_str::<serde_yaml::Value>(content).map_err(parse_err)? {
            serde_yaml::Value::Null => ConfigDocument::default(),
            value => serde_yaml::from_value::<ConfigDocument>(value).map_err(parse_err)?,
        }
    };

    if !document.unknown.is_empty() {
        log::debug!(
            "Ignoring unknown keys in {}: {:?}",
            origin.display(),
            document.unknown.keys().collect::<Vec<_>>()
        );
    }

    IgnoreRuleSet::new(
        document.ignored_dirs.unwrap_or_default(),
        document.ignored_files.unwrap_or_default(),
    )
    .map_err(|source| ConfigError::InvalidPattern {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read and parse a configuration file.
pub fn load_config(path: &Path) -> Result<IgnoreRuleSet, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_config(&content, path)?;
    log::info!("Configuration loaded from {}", path.display());
    Ok(rules)
}

/// A located configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub source: ConfigSource,
    pub path: PathBuf,
}

/// Outcome of rule resolution.
#[derive(Debug, Clone)]
pub struct ResolvedRules {
    pub rules: IgnoreRuleSet,
    /// `None` when no configuration file was found anywhere.
    pub location: Option<ConfigLocation>,
}

impl ResolvedRules {
    /// Warning signal: extraction proceeds with no ignore rules.
    pub fn no_config_found(&self) -> bool {
        self.location.is_none()
    }
}

/// Tool root used when none is given: `$LLMIFY_HOME`, else the directory of
/// the running executable.
pub fn default_tool_root() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os(TOOL_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Locates and loads ignore rules.
///
/// # Examples
///
/// ```no_run
/// use llmify::config::Resolver;
/// use std::path::Path;
///
/// let resolved = Resolver::new().resolve(Path::new(".")).unwrap();
/// if resolved.no_config_found() {
///     eprintln!("no ignore rules applied");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    explicit: Option<PathBuf>,
    tool_root: Option<PathBuf>,
}

impl Resolver {
    /// Resolver with the default tool root and no explicit config.
    pub fn new() -> Self {
        Self {
            explicit: None,
            tool_root: default_tool_root(),
        }
    }

    /// Set the explicit configuration path.
    pub fn explicit_config(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.explicit = path.map(Into::into);
        self
    }

    /// Override the tool root (`None` disables that candidate).
    pub fn tool_root(mut self, root: Option<impl Into<PathBuf>>) -> Self {
        self.tool_root = root.map(Into::into);
        self
    }

    /// Path checked for one candidate source, if that source applies.
    pub fn candidate(&self, source: ConfigSource, target_dir: &Path) -> Option<PathBuf> {
        match source {
            ConfigSource::Explicit => self.explicit.clone(),
            ConfigSource::TargetDir => Some(target_dir.join(CONFIG_FILE_NAME)),
            ConfigSource::ToolRoot => self.tool_root.as_ref().map(|r| r.join(CONFIG_FILE_NAME)),
        }
    }

    /// First existing candidate in [`RESOLUTION_ORDER`].
    pub fn locate(&self, target_dir: &Path) -> Option<ConfigLocation> {
        for source in RESOLUTION_ORDER {
            let Some(path) = self.candidate(source, target_dir) else {
                continue;
            };
            if path.exists() {
                log::debug!("Using {} config: {}", source, path.display());
                return Some(ConfigLocation { source, path });
            }
            if source == ConfigSource::Explicit {
                log::warn!(
                    "Config file {} does not exist; falling back to default locations",
                    path.display()
                );
            } else {
                log::trace!("No {} config at {}", source, path.display());
            }
        }
        None
    }

    /// Locate and load the rules for `target_dir`.
    pub fn resolve(&self, target_dir: &Path) -> Result<ResolvedRules, ConfigError> {
        match self.locate(target_dir) {
            Some(location) => {
                let rules = load_config(&location.path)?;
                Ok(ResolvedRules {
                    rules,
                    location: Some(location),
                })
            }
            None => {
                log::warn!("No configuration file found; no ignore rules will be applied");
                Ok(ResolvedRules {
                    rules: IgnoreRuleSet::empty(),
                    location: None,
                })
            }
        }
    }
}

/// Resolve ignore rules for `target_dir` using the default tool root.
pub fn resolve_rules(
    target_dir: &Path,
    explicit_config: Option<&Path>,
) -> Result<ResolvedRules, ConfigError> {
    Resolver::new()
        .explicit_config(explicit_config)
        .resolve(target_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn origin() -> PathBuf {
        PathBuf::from("test.yaml")
    }

    #[test]
    fn test_parse_both_keys() {
        let rules = parse_config(
            "ignored_dirs: [node_modules, .git]\nignored_files: [\"*.pyc\", secrets.env]\n",
            &origin(),
        )
        .unwrap();

        assert!(rules.is_dir_ignored("node_modules"));
        assert!(rules.is_dir_ignored(".git"));
        assert!(!rules.is_dir_ignored("src"));
        assert!(rules.is_file_ignored("secrets.env"));
        assert!(rules.is_file_ignored("foo.pyc"));
        assert!(!rules.is_file_ignored("foo.py"));
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let rules = parse_config("ignored_dirs:\n  - build\n", &origin()).unwrap();
        assert!(rules.is_dir_ignored("build"));
        assert!(!rules.is_file_ignored("build"));

        let rules = parse_config("ignored_files:\n", &origin()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_config("", &origin()).unwrap().is_empty());
        assert!(parse_config("# just a comment\n", &origin()).unwrap().is_empty());
        assert!(parse_config("~\n", &origin()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let rules = parse_config("ignored_dirs: [a]\nmax_size: 10\n", &origin()).unwrap();
        assert!(rules.is_dir_ignored("a"));
    }

    #[test]
    fn test_non_sequence_is_error() {
        let err = parse_config("ignored_dirs: node_modules\n", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Path::new("test.yaml"));
    }

    #[test]
    fn test_unparseable_yaml_is_error() {
        let err = parse_config("ignored_dirs: [unclosed\n", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = parse_config("- just\n- a list\n", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let err = parse_config("ignored_files: [\"[abc\"]\n", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
        assert!(err.to_string().contains("test.yaml"));
    }

    #[test]
    fn test_glob_matches_basename_only() {
        let rules = IgnoreRuleSet::new(Vec::<String>::new(), ["*.pyc", "sub/*.log"]).unwrap();
        assert!(rules.is_file_ignored("foo.pyc"));
        assert!(rules.is_file_ignored("bar.pyc"));
        // Path-style globs never match a bare name.
        assert!(!rules.is_file_ignored("x.log"));
    }

    #[test]
    fn test_glob_character_classes() {
        let rules = IgnoreRuleSet::new(Vec::<String>::new(), ["data?.csv", "[ab].txt"]).unwrap();
        assert!(rules.is_file_ignored("data1.csv"));
        assert!(!rules.is_file_ignored("data10.csv"));
        assert!(rules.is_file_ignored("a.txt"));
        assert!(!rules.is_file_ignored("c.txt"));
    }

    #[test]
    fn test_literal_names_are_exact() {
        let rules = IgnoreRuleSet::new(["cache"], ["notes.txt"]).unwrap();
        assert!(!rules.is_file_ignored("notes.txt.bak"));
        assert!(!rules.is_dir_ignored("cache2"));
    }

    #[test]
    fn test_resolution_order_constant() {
        assert_eq!(
            RESOLUTION_ORDER,
            [
                ConfigSource::Explicit,
                ConfigSource::TargetDir,
                ConfigSource::ToolRoot
            ]
        );
    }

    #[test]
    fn test_explicit_wins_over_target() {
        let target = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        fs::write(target.path().join(CONFIG_FILE_NAME), "ignored_dirs: [from_target]\n").unwrap();
        let explicit = other.path().join("custom.yaml");
        fs::write(&explicit, "ignored_dirs: [from_explicit]\n").unwrap();

        let resolved = Resolver::default()
            .explicit_config(Some(&explicit))
            .resolve(target.path())
            .unwrap();

        let location = resolved.location.unwrap();
        assert_eq!(location.source, ConfigSource::Explicit);
        assert!(resolved.rules.is_dir_ignored("from_explicit"));
        assert!(!resolved.rules.is_dir_ignored("from_target"));
    }

    #[test]
    fn test_missing_explicit_falls_back_to_target() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join(CONFIG_FILE_NAME), "ignored_dirs: [from_target]\n").unwrap();

        let resolved = Resolver::default()
            .explicit_config(Some(target.path().join("missing.yaml")))
            .resolve(target.path())
            .unwrap();

        assert_eq!(resolved.location.unwrap().source, ConfigSource::TargetDir);
        assert!(resolved.rules.is_dir_ignored("from_target"));
    }

    #[test]
    fn test_tool_root_fallback() {
        let target = TempDir::new().unwrap();
        let tool = TempDir::new().unwrap();
        fs::write(tool.path().join(CONFIG_FILE_NAME), "ignored_files: [\"*.tmp\"]\n").unwrap();

        let resolved = Resolver::default()
            .tool_root(Some(tool.path()))
            .resolve(target.path())
            .unwrap();

        assert_eq!(resolved.location.unwrap().source, ConfigSource::ToolRoot);
        assert!(resolved.rules.is_file_ignored("x.tmp"));
    }

    #[test]
    fn test_no_config_found() {
        let target = TempDir::new().unwrap();
        let tool = TempDir::new().unwrap();

        let resolved = Resolver::default()
            .tool_root(Some(tool.path()))
            .resolve(target.path())
            .unwrap();

        assert!(resolved.no_config_found());
        assert!(resolved.rules.is_empty());
    }

    #[test]
    fn test_malformed_target_config_is_fatal() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join(CONFIG_FILE_NAME), "ignored_files: 42\n").unwrap();

        let err = Resolver::default().resolve(target.path()).unwrap_err();
        assert_eq!(err.path(), target.path().join(CONFIG_FILE_NAME).as_path());
    }
}
