//! Console and file logger backed by the global tracing subscriber.
use std::path::{Path, PathBuf};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET, SUMMARY_TARGET};
use super::types::Log;
use crate::report::{RunReport, summary};

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that emits [`tracing`] events.
///
/// Console and file output are produced by the layers installed with
/// [`init_subscriber`](super::init_subscriber); this type only knows the log
/// file location so it can be shown in the run summary.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// Return the log file path, if any.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose; always in the file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Print the end-of-run summary for `report`.
    ///
    /// Summary lines are emitted even when the console is quiet.
    pub fn print_summary(&self, report: &RunReport) {
        self.stage("Summary");
        for line in summary::render(report).lines() {
            tracing::info!(target: SUMMARY_TARGET, "{line}");
        }
        if let Some(path) = &self.log_file {
            tracing::info!(target: SUMMARY_TARGET, "\x1b[2mlog: {}\x1b[0m", path.display());
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);
}
