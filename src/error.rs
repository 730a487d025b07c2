//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors (e.g. [`ConfigError`], [`TaskError`])
//! while command handlers convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError      settings document: missing, syntax, missing keys, invalid values
//! ItemListError    item list documents: missing vs unreadable
//! ExecError        external commands: non-zero exit, timeout
//! TaskError        task-level conditions that halt the run
//! ValidationError  operator input (git identity, AWS settings)
//! ```
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A single malformed line in the settings document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line number.
    pub line: usize,
    /// What is wrong with the line.
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A key whose value violates its type or range constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    /// The offending key.
    pub key: String,
    /// The raw value found in the document.
    pub value: String,
    /// Human-readable constraint (e.g. `"an integer between 8 and 48"`).
    pub constraint: String,
}

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:?}: must be {}",
            self.key, self.value, self.constraint
        )
    }
}

fn bullet_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| format!("  - {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors from loading the settings document.
///
/// Every variant except [`ConfigError::Io`] enumerates all problems of its
/// class, so the operator can fix them in one pass.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings document does not exist.
    #[error("configuration file not found: {}", .path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The settings document exists but could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// One or more lines are not `KEY=value` assignments.
    #[error("syntax errors in {}:\n{}", .path.display(), bullet_list(.issues))]
    Syntax {
        /// Path of the document.
        path: PathBuf,
        /// Every malformed line.
        issues: Vec<SyntaxIssue>,
    },

    /// Required keys are absent.
    #[error("missing required keys: {}", .keys.join(", "))]
    MissingKeys {
        /// Every missing key, in schema order.
        keys: Vec<String>,
    },

    /// Keys are present but their values violate the schema.
    #[error("invalid configuration values:\n{}", bullet_list(.values))]
    InvalidValues {
        /// Every invalid value, in schema order.
        values: Vec<InvalidValue>,
    },
}

impl ConfigError {
    /// One line per problem, for logging each as its own entry.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        match self {
            Self::Syntax { path, issues } => issues
                .iter()
                .map(|i| format!("{}: {i}", path.display()))
                .collect(),
            Self::MissingKeys { keys } => keys
                .iter()
                .map(|k| format!("missing required key: {k}"))
                .collect(),
            Self::InvalidValues { values } => values.iter().map(ToString::to_string).collect(),
            Self::Missing { .. } | Self::Io { .. } => vec![self.to_string()],
        }
    }
}

/// Errors from loading an item list document.
#[derive(Error, Debug)]
pub enum ItemListError {
    /// The list file does not exist. Callers decide whether this is fatal.
    #[error("item list not found: {}", .path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The list file exists but could not be read.
    #[error("failed to read item list {}: {source}", .path.display())]
    Io {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from running external commands.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The command ran but exited non-zero.
    #[error("{program} failed (exit {code}): {stderr}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit code, `-1` when killed by a signal.
        code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The command exceeded its time budget and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut {
        /// Program name.
        program: String,
        /// The budget that was exceeded.
        timeout: Duration,
    },
}

/// Task-level conditions that stop the whole run.
#[derive(Error, Debug)]
pub enum TaskError {
    /// A required external tool is absent and could not be installed.
    #[error("required tool '{tool}' is unavailable: {reason}")]
    Prerequisite {
        /// The missing tool (e.g. `brew`).
        tool: String,
        /// Why it could not be provided.
        reason: String,
    },
}

/// Operator input that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A value did not satisfy its pattern.
    #[error("invalid {field} '{value}': {expected}")]
    Invalid {
        /// Which input (e.g. `"email"`).
        field: &'static str,
        /// The rejected value.
        value: String,
        /// What a valid value looks like.
        expected: &'static str,
    },

    /// A value was required but none was given and none could be prompted for.
    #[error("{field} is required (pass --{field} or run interactively)")]
    Required {
        /// Which input.
        field: &'static str,
    },
}
