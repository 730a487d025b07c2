//! The `setup.conf` settings document.
//!
//! The document is a list of shell-style assignments:
//!
//! ```text
//! # editor
//! export VSCODE_FONT_SIZE=14
//! VSCODE_COLOR_THEME="Default Dark Modern"
//! NODE_VERSION=latest   # or 20, v20.11.1
//! ```
//!
//! Loading is all-or-nothing: [`Settings::load`] either returns a fully
//! validated value or a [`ConfigError`] that lists every problem of the
//! first failing stage (syntax, then missing keys, then invalid values).
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::validation::{is_valid_branch, is_valid_node_version};
use crate::error::{ConfigError, InvalidValue, SyntaxIssue};

/// Every key the document must define, in reporting order.
pub const REQUIRED_KEYS: &[&str] = &[
    "VSCODE_FONT_SIZE",
    "VSCODE_TAB_SIZE",
    "VSCODE_COLOR_THEME",
    "VSCODE_ICON_THEME",
    "VSCODE_FORMAT_ON_SAVE",
    "VSCODE_AUTO_SAVE",
    "VSCODE_DEFAULT_FORMATTER",
    "VSCODE_WORD_WRAP",
    "DEFAULT_INSTALL_NODE",
    "DEFAULT_INSTALL_NPM_PACKAGES",
    "DEFAULT_CONFIGURE_VSCODE",
    "DEFAULT_INSTALL_TERMINAL_THEME",
    "DEFAULT_CUSTOMIZE_SHELL",
    "GIT_DEFAULT_BRANCH",
    "NODE_VERSION",
];

static KEY: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// VS Code preferences written into the user `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSettings {
    /// `editor.fontSize`, 8 to 48.
    pub font_size: u8,
    /// `editor.tabSize`, 1 to 8.
    pub tab_size: u8,
    /// `workbench.colorTheme`.
    pub color_theme: String,
    /// `workbench.iconTheme`.
    pub icon_theme: String,
    /// `editor.formatOnSave`.
    pub format_on_save: bool,
    /// `files.autoSave`.
    pub auto_save: String,
    /// `editor.defaultFormatter`.
    pub default_formatter: String,
    /// `editor.wordWrap`.
    pub word_wrap: String,
}

/// Default answers for the per-domain confirmation prompts.
///
/// Used as-is in dry-run and non-interactive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PromptDefaults {
    /// Install Node.js through nvm.
    pub install_node: bool,
    /// Install global npm packages.
    pub install_npm_packages: bool,
    /// Configure VS Code settings and extensions.
    pub configure_vscode: bool,
    /// Import the terminal theme.
    pub install_terminal_theme: bool,
    /// Maintain the shell profile block.
    pub customize_shell: bool,
}

/// The Node.js release to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeVersion {
    /// The newest release.
    Latest,
    /// A specific (possibly partial) version such as `20` or `v20.11.1`.
    Exact(String),
}

impl NodeVersion {
    /// The version argument understood by `nvm install`.
    #[must_use]
    pub fn nvm_spec(&self) -> &str {
        match self {
            Self::Latest => "node",
            Self::Exact(v) => v,
        }
    }
}

impl std::fmt::Display for NodeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Validated contents of `setup.conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Editor preferences.
    pub editor: EditorSettings,
    /// Prompt defaults.
    pub prompts: PromptDefaults,
    /// Value for `git config init.defaultBranch`.
    pub git_default_branch: String,
    /// Node.js release managed by nvm.
    pub node_version: NodeVersion,
}

impl Settings {
    /// Load and validate the settings document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if the file does not exist,
    /// [`ConfigError::Io`] if it cannot be read, and the errors of
    /// [`Settings::parse`] otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate document text; `path` is used only in messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Syntax`], [`ConfigError::MissingKeys`] or
    /// [`ConfigError::InvalidValues`], each carrying every problem found at
    /// that stage.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let values = parse_assignments(content).map_err(|issues| ConfigError::Syntax {
            path: path.to_path_buf(),
            issues,
        })?;

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|k| !values.contains_key(**k))
            .map(|k| (*k).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys { keys: missing });
        }

        let mut v = Checker {
            values: &values,
            invalid: Vec::new(),
        };
        let settings = Self {
            editor: EditorSettings {
                font_size: v.int("VSCODE_FONT_SIZE", 8, 48),
                tab_size: v.int("VSCODE_TAB_SIZE", 1, 8),
                color_theme: v.string("VSCODE_COLOR_THEME"),
                icon_theme: v.string("VSCODE_ICON_THEME"),
                format_on_save: v.boolean("VSCODE_FORMAT_ON_SAVE"),
                auto_save: v.string("VSCODE_AUTO_SAVE"),
                default_formatter: v.string("VSCODE_DEFAULT_FORMATTER"),
                word_wrap: v.string("VSCODE_WORD_WRAP"),
            },
            prompts: PromptDefaults {
                install_node: v.boolean("DEFAULT_INSTALL_NODE"),
                install_npm_packages: v.boolean("DEFAULT_INSTALL_NPM_PACKAGES"),
                configure_vscode: v.boolean("DEFAULT_CONFIGURE_VSCODE"),
                install_terminal_theme: v.boolean("DEFAULT_INSTALL_TERMINAL_THEME"),
                customize_shell: v.boolean("DEFAULT_CUSTOMIZE_SHELL"),
            },
            git_default_branch: v.checked(
                "GIT_DEFAULT_BRANCH",
                is_valid_branch,
                "a valid git branch name",
            ),
            node_version: {
                let raw = v.checked(
                    "NODE_VERSION",
                    is_valid_node_version,
                    "'latest' or a version like 20, v20.11 or 20.11.1",
                );
                if raw == "latest" {
                    NodeVersion::Latest
                } else {
                    NodeVersion::Exact(raw)
                }
            },
        };

        if v.invalid.is_empty() {
            Ok(settings)
        } else {
            Err(ConfigError::InvalidValues { values: v.invalid })
        }
    }
}

/// Typed accessors that record a violation instead of failing, so every
/// invalid value is reported together.
struct Checker<'a> {
    values: &'a HashMap<String, String>,
    invalid: Vec<InvalidValue>,
}

impl Checker<'_> {
    fn raw(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    fn reject(&mut self, key: &str, constraint: &str) {
        self.invalid.push(InvalidValue {
            key: key.to_string(),
            value: self.raw(key).to_string(),
            constraint: constraint.to_string(),
        });
    }

    fn int(&mut self, key: &str, min: u8, max: u8) -> u8 {
        match self.raw(key).parse::<u8>() {
            Ok(n) if (min..=max).contains(&n) => n,
            _ => {
                self.reject(key, &format!("an integer between {min} and {max}"));
                min
            }
        }
    }

    fn string(&mut self, key: &str) -> String {
        let value = self.raw(key).to_string();
        if value.is_empty() {
            self.reject(key, "a non-empty string");
        }
        value
    }

    fn boolean(&mut self, key: &str) -> bool {
        match self.raw(key).to_ascii_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            _ => {
                self.reject(key, "one of true, false, yes, no");
                false
            }
        }
    }

    fn checked(&mut self, key: &str, valid: fn(&str) -> bool, constraint: &str) -> String {
        let value = self.raw(key).to_string();
        if !valid(&value) {
            self.reject(key, constraint);
        }
        value
    }
}

/// Split the document into `KEY => value`, collecting every malformed line.
///
/// Later assignments to the same key win, as they would when sourced by a
/// shell.
fn parse_assignments(content: &str) -> Result<HashMap<String, String>, Vec<SyntaxIssue>> {
    let mut values = HashMap::new();
    let mut issues = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(trimmed) {
            Ok((key, value)) => {
                values.insert(key.to_string(), value);
            }
            Err(message) => issues.push(SyntaxIssue {
                line: idx + 1,
                message,
            }),
        }
    }

    if issues.is_empty() {
        Ok(values)
    } else {
        Err(issues)
    }
}

fn parse_line(line: &str) -> Result<(&str, String), String> {
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let Some((key, rest)) = line.split_once('=') else {
        return Err(format!("expected KEY=value, found '{line}'"));
    };
    if !KEY.as_ref().is_some_and(|re| re.is_match(key)) {
        return Err(format!("invalid key name '{key}'"));
    }
    Ok((key, parse_value(rest)?))
}

/// Unquote a value, or strip a trailing ` # comment` from a bare one.
fn parse_value(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    let Some(quote) = raw.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        let bare = raw
            .find(" #")
            .or_else(|| raw.find("\t#"))
            .map_or(raw, |i| raw.get(..i).unwrap_or(raw));
        return Ok(bare.trim_end().to_string());
    };
    let body = raw.get(1..).unwrap_or_default();
    let Some(end) = body.find(quote) else {
        return Err(format!("unterminated {quote} quote"));
    };
    let tail = body.get(end + 1..).unwrap_or_default().trim();
    if !tail.is_empty() && !tail.starts_with('#') {
        return Err(format!("unexpected text after closing quote: '{tail}'"));
    }
    Ok(body.get(..end).unwrap_or_default().to_string())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::test_helpers::{SAMPLE_SETTINGS, write_temp_file};

    fn parse(content: &str) -> Result<Settings, ConfigError> {
        Settings::parse(content, Path::new("setup.conf"))
    }

    #[test]
    fn sample_round_trips_exactly() {
        let settings = parse(SAMPLE_SETTINGS).unwrap();
        assert_eq!(
            settings,
            Settings {
                editor: EditorSettings {
                    font_size: 14,
                    tab_size: 2,
                    color_theme: "Default Dark Modern".to_string(),
                    icon_theme: "vs-seti".to_string(),
                    format_on_save: true,
                    auto_save: "afterDelay".to_string(),
                    default_formatter: "esbenp.prettier-vscode".to_string(),
                    word_wrap: "on".to_string(),
                },
                prompts: PromptDefaults {
                    install_node: true,
                    install_npm_packages: true,
                    configure_vscode: true,
                    install_terminal_theme: false,
                    customize_shell: true,
                },
                git_default_branch: "main".to_string(),
                node_version: NodeVersion::Latest,
            }
        );
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("setup.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn load_reads_file() {
        let (_dir, path) = write_temp_file("setup.conf", SAMPLE_SETTINGS);
        assert_eq!(Settings::load(&path).unwrap().git_default_branch, "main");
    }

    #[test]
    fn every_missing_key_is_reported() {
        let content: String = SAMPLE_SETTINGS
            .lines()
            .filter(|l| !l.contains("NODE_VERSION") && !l.contains("VSCODE_TAB_SIZE"))
            .map(|l| format!("{l}\n"))
            .collect();
        let err = parse(&content).unwrap_err();
        match err {
            ConfigError::MissingKeys { keys } => {
                assert_eq!(keys, vec!["VSCODE_TAB_SIZE", "NODE_VERSION"]);
            }
            other => panic!("expected MissingKeys, got {other}"),
        }
    }

    #[test]
    fn empty_document_reports_all_keys() {
        match parse("").unwrap_err() {
            ConfigError::MissingKeys { keys } => assert_eq!(keys.len(), REQUIRED_KEYS.len()),
            other => panic!("expected MissingKeys, got {other}"),
        }
    }

    #[test]
    fn font_size_out_of_range_names_key_and_range() {
        let content = SAMPLE_SETTINGS.replace("VSCODE_FONT_SIZE=14", "VSCODE_FONT_SIZE=99");
        let err = parse(&content).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("VSCODE_FONT_SIZE"), "{msg}");
        assert!(msg.contains("between 8 and 48"), "{msg}");
    }

    #[test]
    fn every_invalid_value_is_reported() {
        let content = SAMPLE_SETTINGS
            .replace("VSCODE_TAB_SIZE=2", "VSCODE_TAB_SIZE=two")
            .replace("DEFAULT_INSTALL_NODE=yes", "DEFAULT_INSTALL_NODE=maybe")
            .replace("NODE_VERSION=latest", "NODE_VERSION=lts")
            .replace("GIT_DEFAULT_BRANCH=main", "GIT_DEFAULT_BRANCH=bad..name");
        match parse(&content).unwrap_err() {
            ConfigError::InvalidValues { values } => {
                let keys: Vec<_> = values.iter().map(|v| v.key.as_str()).collect();
                assert_eq!(
                    keys,
                    vec![
                        "VSCODE_TAB_SIZE",
                        "DEFAULT_INSTALL_NODE",
                        "GIT_DEFAULT_BRANCH",
                        "NODE_VERSION"
                    ]
                );
            }
            other => panic!("expected InvalidValues, got {other}"),
        }
    }

    #[test]
    fn empty_string_value_is_invalid() {
        let content = SAMPLE_SETTINGS.replace(
            "VSCODE_WORD_WRAP=on",
            "VSCODE_WORD_WRAP=\"\"",
        );
        match parse(&content).unwrap_err() {
            ConfigError::InvalidValues { values } => assert_eq!(values[0].key, "VSCODE_WORD_WRAP"),
            other => panic!("expected InvalidValues, got {other}"),
        }
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let content = format!("{SAMPLE_SETTINGS}not an assignment\n9KEY=1\nQUOTED=\"open\n");
        match parse(&content).unwrap_err() {
            ConfigError::Syntax { issues, .. } => {
                assert_eq!(issues.len(), 3);
                let base = SAMPLE_SETTINGS.lines().count();
                assert_eq!(issues[0].line, base + 1);
                assert!(issues[1].message.contains("invalid key name"));
                assert!(issues[2].message.contains("unterminated"));
            }
            other => panic!("expected Syntax, got {other}"),
        }
    }

    #[test]
    fn syntax_is_checked_before_missing_keys() {
        let err = parse("garbage\n").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { .. }));
    }

    #[test]
    fn values_unquoted_and_comments_stripped() {
        assert_eq!(parse_line("A=plain").unwrap(), ("A", "plain".to_string()));
        assert_eq!(parse_line("export A=1").unwrap(), ("A", "1".to_string()));
        assert_eq!(parse_line("A='x # y'").unwrap(), ("A", "x # y".to_string()));
        assert_eq!(parse_line("A=\"a b\"  # note").unwrap(), ("A", "a b".to_string()));
        assert_eq!(parse_line("A=value # note").unwrap(), ("A", "value".to_string()));
        assert_eq!(parse_line("A=").unwrap(), ("A", String::new()));
        assert!(parse_line("A=\"a\" b").is_err());
    }

    #[test]
    fn later_assignment_wins() {
        let content = format!("{SAMPLE_SETTINGS}VSCODE_FONT_SIZE=16\n");
        assert_eq!(parse(&content).unwrap().editor.font_size, 16);
    }

    #[test]
    fn booleans_are_case_insensitive() {
        let content = SAMPLE_SETTINGS.replace("VSCODE_FORMAT_ON_SAVE=true", "VSCODE_FORMAT_ON_SAVE=No");
        assert!(!parse(&content).unwrap().editor.format_on_save);
    }

    #[test]
    fn node_version_exact() {
        let content = SAMPLE_SETTINGS.replace("NODE_VERSION=latest", "NODE_VERSION=v20.11");
        let settings = parse(&content).unwrap();
        assert_eq!(settings.node_version, NodeVersion::Exact("v20.11".to_string()));
        assert_eq!(settings.node_version.nvm_spec(), "v20.11");
        assert_eq!(NodeVersion::Latest.nvm_spec(), "node");
    }
}
