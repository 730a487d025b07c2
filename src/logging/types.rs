//! Core logging types: console verbosity and the [`Log`] trait.

/// How much console output a run produces.
///
/// The log file always receives everything at debug level and above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Informational output (default).
    #[default]
    Normal,
    /// Include debug messages.
    Verbose,
}

impl Verbosity {
    /// Derive the verbosity from the `--quiet` / `--verbose` flags.
    ///
    /// `--verbose` wins when both are given.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }
}

/// Abstraction over logging backends.
///
/// Task and resource code logs through this trait so tests can substitute
/// their own sink.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}
