//! Linter configuration discovery and probing.
//!
//! The resolver walks upward from the document looking for
//! `.scss-lint.yml` and scans the file's raw text with two independent
//! probes: an `exclude:` glob list and a `FinalNewLine` rule block. The
//! probing is deliberately tolerant of the file's exact YAML structure;
//! unknown keys and future rule blocks are opaque.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobSetBuilder};
use regex::Regex;
use tracing::{debug, warn};

use crate::settings::LintSettings;

/// File name the resolver searches for.
pub const CONFIG_FILE_NAME: &str = ".scss-lint.yml";

/// Behavior of the trailing-newline heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalNewlinePolicy {
    /// The rule block is present with `enabled: false`.
    Disabled,
    /// The rule block is present with `severity: error`.
    Error,
    /// No matching rule block; the default.
    #[default]
    Warning,
}

/// Effective configuration for one lint cycle.
///
/// Built fresh per cycle and never cached; the config file can change
/// between edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    /// The linter's config file, when one exists.
    pub config_file: Option<PathBuf>,
    /// Directory used as the process working directory and the base for
    /// exclusion patterns.
    pub config_dir: Option<PathBuf>,
    /// Ordered glob patterns from the config's `exclude:` line.
    pub exclude_patterns: Vec<String>,
    /// Trailing-newline policy probed from the config text.
    pub final_newline: FinalNewlinePolicy,
}

fn exclude_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^exclude:[ \t]*(.+)$").expect("Invalid exclude probe regex"))
}

fn final_newline_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^([ \t]*)FinalNewLine:[ \t]*\r?\n")
            .expect("Invalid FinalNewLine probe regex")
    })
}

fn enabled_false_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)enabled:[ \t]*false").expect("Invalid enabled probe regex"))
}

fn severity_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)severity:[ \t]*error").expect("Invalid severity probe regex"))
}

/// Resolves the effective linter configuration for a document.
///
/// An explicit `configDir` setting is used verbatim (no upward search);
/// a relative one is interpreted against the workspace root. Otherwise
/// the nearest ancestor directory containing [`CONFIG_FILE_NAME`] wins.
/// Missing or unreadable config degrades to "no config"; it is never
/// surfaced as an error diagnostic.
pub fn resolve(
    document_path: &Path,
    settings: &LintSettings,
    workspace_root: Option<&Path>,
) -> ResolvedConfig {
    let config_dir = match &settings.config_dir {
        Some(dir) if dir.is_relative() => Some(
            workspace_root
                .map(|root| root.join(dir))
                .unwrap_or_else(|| dir.clone()),
        ),
        Some(dir) => Some(dir.clone()),
        None => find_config_dir(document_path),
    };

    let config_file = config_dir
        .as_ref()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file());

    let mut resolved = ResolvedConfig {
        config_file,
        config_dir,
        ..Default::default()
    };

    if let Some(file) = resolved.config_file.clone() {
        match fs::read_to_string(&file) {
            Ok(raw) => {
                resolved.exclude_patterns = parse_exclude_patterns(&raw);
                resolved.final_newline = probe_final_newline(&raw);
            }
            Err(e) => {
                warn!("Unreadable config file {}: {}", file.display(), e);
                resolved.config_file = None;
            }
        }
    }

    resolved
}

/// Walks upward from the document's containing directory and returns the
/// first ancestor holding a config file.
fn find_config_dir(document_path: &Path) -> Option<PathBuf> {
    let start = document_path.parent()?;
    for dir in start.ancestors() {
        if dir.join(CONFIG_FILE_NAME).is_file() {
            return Some(dir.to_path_buf());
        }
    }
    debug!(
        "No {} found above {}",
        CONFIG_FILE_NAME,
        document_path.display()
    );
    None
}

/// Extracts glob patterns from the config's `exclude:` line.
///
/// The remainder of the line is one or more comma-separated patterns,
/// optionally quoted.
fn parse_exclude_patterns(raw: &str) -> Vec<String> {
    let Some(caps) = exclude_line_re().captures(raw) else {
        return Vec::new();
    };
    caps[1]
        .split(',')
        .map(|p| p.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Probes the raw config text for a `FinalNewLine` rule block.
///
/// Two steps: find the `FinalNewLine:` header, then scan the following
/// lines while they are indented strictly deeper than the header. A
/// sibling rule block at the header's indentation ends the scan, so its
/// keys are never attributed to `FinalNewLine`.
fn probe_final_newline(raw: &str) -> FinalNewlinePolicy {
    let Some(caps) = final_newline_header_re().captures(raw) else {
        return FinalNewlinePolicy::Warning;
    };
    let header_indent = caps[1].len();
    let body_start = caps.get(0).map_or(raw.len(), |m| m.end());

    let block: String = raw[body_start..]
        .lines()
        .take_while(|line| {
            line.trim().is_empty() || indent_width(line) > header_indent
        })
        .collect::<Vec<_>>()
        .join("\n");

    if enabled_false_re().is_match(&block) {
        FinalNewlinePolicy::Disabled
    } else if severity_error_re().is_match(&block) {
        FinalNewlinePolicy::Error
    } else {
        FinalNewlinePolicy::Warning
    }
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

impl ResolvedConfig {
    /// Whether the document is a member of the exclusion set.
    ///
    /// Patterns are interpreted relative to the config directory. A
    /// match abandons the whole lint cycle: no process is spawned and no
    /// diagnostics change.
    pub fn is_excluded(&self, document_path: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return false;
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => warn!("Invalid exclude pattern '{}': {}", pattern, e),
            }
        }
        let set = match builder.build() {
            Ok(set) => set,
            Err(e) => {
                warn!("Failed to build exclusion matcher: {}", e);
                return false;
            }
        };

        let candidate = self
            .config_dir
            .as_ref()
            .and_then(|dir| document_path.strip_prefix(dir).ok())
            .unwrap_or(document_path);

        set.is_match(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn write_config(dir: &Path, contents: &str) {
        fs::write(dir.join(CONFIG_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn test_upward_discovery_from_nested_document() {
        let root = tempfile::tempdir().unwrap();
        write_config(root.path(), "linters:\n");
        let nested = root.path().join("a/b/c/d");
        fs::create_dir_all(&nested).unwrap();
        let doc = nested.join("style.scss");
        fs::write(&doc, "p { color: red; }\n").unwrap();

        let resolved = resolve(&doc, &LintSettings::default(), None);
        assert_eq!(resolved.config_dir.as_deref(), Some(root.path()));
        assert_eq!(
            resolved.config_file.as_deref(),
            Some(root.path().join(CONFIG_FILE_NAME).as_path())
        );
    }

    #[test]
    fn test_no_ancestor_config_is_not_fatal() {
        let root = tempfile::tempdir().unwrap();
        let doc = root.path().join("style.scss");
        fs::write(&doc, "").unwrap();

        let resolved = resolve(&doc, &LintSettings::default(), None);
        assert!(resolved.config_dir.is_none());
        assert!(resolved.config_file.is_none());
        assert_eq!(resolved.final_newline, FinalNewlinePolicy::Warning);
    }

    #[test]
    fn test_explicit_config_dir_skips_discovery() {
        let root = tempfile::tempdir().unwrap();
        let explicit = root.path().join("lint-config");
        fs::create_dir_all(&explicit).unwrap();
        write_config(&explicit, "linters:\n");
        // A closer config that discovery would have found.
        let doc_dir = root.path().join("src");
        fs::create_dir_all(&doc_dir).unwrap();
        write_config(&doc_dir, "linters:\n");
        let doc = doc_dir.join("style.scss");
        fs::write(&doc, "").unwrap();

        let settings = LintSettings {
            config_dir: Some(explicit.clone()),
            ..Default::default()
        };
        let resolved = resolve(&doc, &settings, None);
        assert_eq!(resolved.config_dir, Some(explicit));
    }

    #[test]
    fn test_relative_config_dir_is_joined_to_workspace_root() {
        let root = tempfile::tempdir().unwrap();
        let lint_dir = root.path().join("tools/lint");
        fs::create_dir_all(&lint_dir).unwrap();
        write_config(&lint_dir, "linters:\n");
        let doc = root.path().join("style.scss");
        fs::write(&doc, "").unwrap();

        let settings = LintSettings {
            config_dir: Some(PathBuf::from("tools/lint")),
            ..Default::default()
        };
        let resolved = resolve(&doc, &settings, Some(root.path()));
        assert_eq!(resolved.config_dir, Some(lint_dir));
        assert!(resolved.config_file.is_some());
    }

    #[test]
    fn test_exclude_line_parsing() {
        let patterns =
            parse_exclude_patterns("exclude: 'vendor/**', \"node_modules/**\", dist/*.scss\n");
        assert_eq!(patterns, vec!["vendor/**", "node_modules/**", "dist/*.scss"]);
    }

    #[test]
    fn test_exclude_absent_yields_no_patterns() {
        assert!(parse_exclude_patterns("linters:\n  Indentation:\n    width: 2\n").is_empty());
    }

    #[rstest]
    #[case::disabled("linters:\n  FinalNewline:\n    enabled: false\n", FinalNewlinePolicy::Disabled)]
    #[case::error("linters:\n  FinalNewline:\n    severity: error\n", FinalNewlinePolicy::Error)]
    #[case::enabled_wins_over_severity(
        "linters:\n  FinalNewline:\n    enabled: false\n    severity: error\n",
        FinalNewlinePolicy::Disabled
    )]
    #[case::present_without_keys("linters:\n  FinalNewline:\n    foo: bar\n", FinalNewlinePolicy::Warning)]
    #[case::absent("linters:\n  Indentation:\n    width: 2\n", FinalNewlinePolicy::Warning)]
    #[case::case_insensitive("LINTERS:\n  FINALNEWLINE:\n    ENABLED: FALSE\n", FinalNewlinePolicy::Disabled)]
    #[case::sibling_disabled_not_attributed(
        "linters:\n  FinalNewline:\n    severity: error\n  HexLength:\n    enabled: false\n",
        FinalNewlinePolicy::Error
    )]
    #[case::sibling_severity_not_attributed(
        "linters:\n  FinalNewline:\n    enabled: false\n  HexLength:\n    severity: error\n",
        FinalNewlinePolicy::Disabled
    )]
    #[case::sibling_after_blank_line(
        "linters:\n  FinalNewline:\n    severity: error\n\n  HexLength:\n    enabled: false\n",
        FinalNewlinePolicy::Error
    )]
    #[case::block_ends_at_next_top_level_key(
        "linters:\n  FinalNewline:\n    severity: error\nscss_files: '**/*.scss'\n",
        FinalNewlinePolicy::Error
    )]
    fn test_final_newline_probe(#[case] raw: &str, #[case] expected: FinalNewlinePolicy) {
        assert_eq!(probe_final_newline(raw), expected);
    }

    #[test]
    fn test_exclusion_membership_relative_to_config_dir() {
        let root = tempfile::tempdir().unwrap();
        let config = ResolvedConfig {
            config_dir: Some(root.path().to_path_buf()),
            exclude_patterns: vec!["vendor/**".to_string()],
            ..Default::default()
        };
        assert!(config.is_excluded(&root.path().join("vendor/lib/style.scss")));
        assert!(!config.is_excluded(&root.path().join("src/style.scss")));
    }

    #[test]
    fn test_invalid_exclude_pattern_is_ignored() {
        let config = ResolvedConfig {
            exclude_patterns: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(!config.is_excluded(Path::new("src/style.scss")));
    }

    #[test]
    fn test_config_probes_feed_resolved_config() {
        let root = tempfile::tempdir().unwrap();
        write_config(
            root.path(),
            "exclude: 'vendor/**'\nlinters:\n  FinalNewline:\n    severity: error\n",
        );
        let doc = root.path().join("style.scss");
        fs::write(&doc, "").unwrap();

        let resolved = resolve(&doc, &LintSettings::default(), None);
        assert_eq!(resolved.exclude_patterns, vec!["vendor/**"]);
        assert_eq!(resolved.final_newline, FinalNewlinePolicy::Error);
    }
}
