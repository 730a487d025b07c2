//! Provisioning domains, each a named task run in a fixed order.
/// Homebrew casks and formulae.
pub mod applications;
mod context;
/// VS Code extensions.
pub mod editor_extensions;
/// VS Code user settings.
pub mod editor_settings;
/// Homebrew itself.
pub mod homebrew;
/// nvm and Node.js.
pub mod node;
/// Global npm packages.
pub mod npm_packages;
mod processing;
/// The managed shell profile block.
pub mod shell_profile;
/// The terminal colour theme.
pub mod terminal_theme;

pub use context::{Context, home_dir};
pub use processing::{TaskResult, apply_resource, list_result, load_optional_list, prerequisite};

use anyhow::Result;

use crate::config::Settings;
use crate::error::TaskError;
use crate::report::ErrorKind;

/// A yes/no question asked before a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Question shown to the operator.
    pub question: &'static str,
    /// Answer used with `--yes`, in dry-run, and for empty input.
    pub default: bool,
}

/// A named, executable provisioning step.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Domain the task's outcomes are tallied under.
    fn domain(&self) -> &str;

    /// Question that must be answered yes before the task runs.
    fn confirmation(&self, _settings: &Settings) -> Option<Confirmation> {
        None
    }

    /// Whether this task applies on the current platform.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete. A
    /// [`TaskError::Prerequisite`] stops the whole run.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Every provisioning task, in execution order.
#[must_use]
pub fn all_provision_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(homebrew::InstallHomebrew),
        Box::new(applications::InstallApplications),
        Box::new(node::InstallNode),
        Box::new(npm_packages::InstallNpmPackages),
        Box::new(editor_settings::ConfigureEditorSettings),
        Box::new(editor_extensions::InstallEditorExtensions),
        Box::new(terminal_theme::InstallTerminalTheme),
        Box::new(shell_profile::ConfigureShellProfile),
    ]
}

fn matches_filter(task: &dyn Task, filter: &str) -> bool {
    let filter = filter.to_lowercase();
    task.name().to_lowercase().contains(&filter) || task.domain().to_lowercase().contains(&filter)
}

/// Keep tasks matching any `only` filter (all when empty) and no `skip`
/// filter. Filters match task names or domains, case-insensitively.
#[must_use]
pub fn select(tasks: Vec<Box<dyn Task>>, only: &[String], skip: &[String]) -> Vec<Box<dyn Task>> {
    tasks
        .into_iter()
        .filter(|t| only.is_empty() || only.iter().any(|f| matches_filter(t.as_ref(), f)))
        .filter(|t| !skip.iter().any(|f| matches_filter(t.as_ref(), f)))
        .collect()
}

/// Execute a task, recording its outcome in the context's collector.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        return;
    }

    ctx.log.stage(task.name());

    if let Some(c) = task.confirmation(&ctx.settings)
        && !ctx.confirm(c.question, c.default)
    {
        ctx.log.info("skipped: declined");
        ctx.collector.record_skip(task.domain());
        return;
    }

    match task.run(ctx) {
        Ok(TaskResult::Ok | TaskResult::DryRun) => {}
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
        }
        Err(e) => {
            let message = format!("{e:#}");
            ctx.log.error(&format!("{}: {message}", task.name()));
            if e.downcast_ref::<TaskError>().is_some() {
                ctx.collector
                    .report_fatal(ErrorKind::Prerequisite, task.domain(), message);
            } else {
                ctx.collector.report_failure(task.domain(), message);
            }
        }
    }
}

/// Run tasks in order, stopping after the first fatal error.
pub fn run_all(tasks: &[Box<dyn Task>], ctx: &Context) {
    for task in tasks {
        execute(task.as_ref(), ctx);
        if ctx.collector.has_fatal() {
            ctx.log
                .error(&format!("stopping: {} could not complete", task.name()));
            break;
        }
    }
}
