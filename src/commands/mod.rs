//! Top-level subcommand orchestration.
pub mod aws;
pub mod check;
pub mod completions;
pub mod git;
pub mod install;
pub mod version;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{Layout, SETTINGS_FILE, Settings};
use crate::error::ValidationError;
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::report::{ErrorCollector, ErrorKind, RunReport};
use crate::resources::Resource;
use crate::simulate::{DefaultPrompter, Mode, Prompter, TerminalPrompter};
use crate::tasks::{self, Context, Task, apply_resource};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DEVSTRAP_ROOT";

/// Domain that configuration problems are reported under.
pub const CONFIG_DOMAIN: &str = "Configuration";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution and settings loading so that each command
/// does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Locations of the declarative inputs.
    pub layout: Layout,
    /// Validated settings document.
    pub settings: Settings,
}

impl CommandSetup {
    /// Resolve the root and load the settings document.
    ///
    /// An unresolvable root and every configuration problem are logged one
    /// per line and reported to `collector` as fatal [`ErrorKind::Config`]
    /// records; the result is then `None` so the caller can still print a
    /// summary.
    pub fn init(global: &GlobalOpts, log: &dyn Log, collector: &ErrorCollector) -> Option<Self> {
        let root = match resolve_root(global) {
            Ok(root) => root,
            Err(e) => {
                let message = format!("{e:#}");
                log.error(&message);
                collector.report_fatal(ErrorKind::Config, CONFIG_DOMAIN, message);
                return None;
            }
        };
        log.debug(&format!("root: {}", root.display()));
        let layout = Layout::new(&root);

        log.stage("Loading configuration");
        let path = global.config.clone().unwrap_or_else(|| layout.settings());
        match Settings::load(&path) {
            Ok(settings) => {
                log.info(&format!("loaded {}", path.display()));
                log.debug(&format!(
                    "node {}, default branch {}",
                    settings.node_version, settings.git_default_branch
                ));
                Some(Self { layout, settings })
            }
            Err(e) => {
                let problems = e.problems();
                log.error(&format!(
                    "found {} configuration problem(s):",
                    problems.len()
                ));
                for problem in problems {
                    log.error(&format!("  {problem}"));
                    collector.report_fatal(ErrorKind::Config, CONFIG_DOMAIN, problem);
                }
                None
            }
        }
    }

    /// Build the task context for this run from the global options.
    ///
    /// An undeterminable home directory is reported to `collector` as a
    /// fatal [`ErrorKind::Config`] record and yields `None`.
    pub fn into_context(
        self,
        global: &GlobalOpts,
        log: &Arc<dyn Log>,
        collector: Arc<ErrorCollector>,
    ) -> Option<Context> {
        let mode = Mode::from_flag(global.dry_run);
        let ctx = match Context::new(self.settings, self.layout, Arc::clone(log)) {
            Ok(ctx) => ctx,
            Err(e) => {
                let message = format!("{e:#}");
                log.error(&message);
                collector.report_fatal(ErrorKind::Config, CONFIG_DOMAIN, message);
                return None;
            }
        };
        if mode == Mode::DryRun {
            log.info("dry run: no changes will be made");
        }
        let executor = SystemExecutor::with_timeout(Duration::from_secs(global.timeout));
        Some(
            ctx.with_mode(mode)
                .with_executor(Arc::new(executor))
                .with_prompter(prompter(global))
                .with_parallel(global.parallel)
                .with_collector(collector),
        )
    }
}

/// `--yes` answers every prompt with its default; otherwise the terminal is
/// asked, which itself falls back to defaults without a TTY.
fn prompter(global: &GlobalOpts) -> Arc<dyn Prompter> {
    if global.yes {
        Arc::new(DefaultPrompter)
    } else {
        Arc::new(TerminalPrompter)
    }
}

/// Execute tasks in order until one reports a fatal error, then snapshot the
/// run.
#[must_use]
pub fn run_tasks_to_completion(tasks: &[Box<dyn Task>], ctx: &Context) -> RunReport {
    tasks::run_all(tasks, ctx);
    ctx.collector.finalize()
}

/// An operator-supplied value: the flag when given, otherwise the answer to
/// `question` offered with the current value as default. Dry runs take the
/// current value without asking; with no current value the prompt is only
/// announced and the result is `None`.
fn operator_value(
    ctx: &Context,
    field: &'static str,
    question: &str,
    given: Option<&str>,
    current: impl FnOnce() -> Option<String>,
) -> Result<Option<String>, ValidationError> {
    let value = match given {
        Some(v) => v.to_string(),
        None => {
            let current = current().unwrap_or_default();
            if !ctx.is_dry_run() {
                ctx.prompter.input(question, &current)
            } else if current.trim().is_empty() {
                ctx.log.dry_run(&format!("would prompt for {question}"));
                return Ok(None);
            } else {
                current
            }
        }
    };
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Converge each resource under `domain`; a failing resource is recorded
/// and the rest still run.
fn apply_each(ctx: &Context, domain: &str, resources: &[&dyn Resource]) {
    for resource in resources {
        if let Err(e) = apply_resource(ctx, domain, *resource) {
            let message = format!("{}: {e:#}", resource.description());
            ctx.log.error(&message);
            ctx.collector.report_failure(domain, message);
        }
    }
}

/// Resolve the repository root: `--root`, then `$DEVSTRAP_ROOT`, then the
/// current directory when it holds a settings document.
///
/// # Errors
///
/// Returns an error if no candidate applies or the chosen directory does not
/// exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let root = root_candidate(global.root.as_deref(), std::env::var_os(ROOT_ENV), &cwd)
        .with_context(|| {
            format!(
                "cannot determine devstrap root. Run from a directory containing {SETTINGS_FILE}, use --root, or set {ROOT_ENV}"
            )
        })?;
    dunce::canonicalize(&root)
        .with_context(|| format!("root directory not found: {}", root.display()))
}

fn root_candidate(explicit: Option<&Path>, env: Option<OsString>, cwd: &Path) -> Option<PathBuf> {
    if let Some(root) = explicit {
        return Some(root.to_path_buf());
    }
    if let Some(root) = env.filter(|r| !r.is_empty()) {
        return Some(PathBuf::from(root));
    }
    cwd.join(SETTINGS_FILE).is_file().then(|| cwd.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod test_helpers {
    use std::path::{Path, PathBuf};

    use crate::cli::GlobalOpts;
    use crate::config::test_helpers::SAMPLE_SETTINGS;
    use crate::exec::DEFAULT_TIMEOUT;

    /// Global options pointing at `root`, non-interactive.
    pub(crate) fn global_for(root: &Path) -> GlobalOpts {
        GlobalOpts {
            dry_run: false,
            root: Some(root.to_path_buf()),
            config: None,
            yes: true,
            parallel: false,
            timeout: DEFAULT_TIMEOUT.as_secs(),
            log_file: None,
        }
    }

    /// A temp root holding the sample settings document.
    pub(crate) fn sample_root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setup.conf"), SAMPLE_SETTINGS).unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        (dir, root)
    }
}
