use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::config::{Layout, Settings};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::Platform;
use crate::reconcile::{Reconciler, ResourceKind};
use crate::report::ErrorCollector;
use crate::resources::node::NvmShell;
use crate::simulate::{DefaultPrompter, Mode, Prompter, Simulator};

/// Shared context for task execution.
pub struct Context {
    /// Validated settings document.
    pub settings: Arc<Settings>,
    /// Locations of the declarative inputs.
    pub layout: Layout,
    /// Detected platform information.
    pub platform: Platform,
    /// Logger for output.
    pub log: Arc<dyn Log>,
    /// Dry-run gate for every mutating action.
    pub simulator: Simulator,
    /// User's home directory path.
    pub home: PathBuf,
    /// nvm installation directory (`$NVM_DIR`, default `~/.nvm`).
    pub nvm_dir: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Source of interactive answers.
    pub prompter: Arc<dyn Prompter>,
    /// Collects per-domain tallies and error records for the run.
    pub collector: Arc<ErrorCollector>,
    /// Whether to reconcile list items in parallel using Rayon.
    pub parallel: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &"<Settings>")
            .field("layout", &self.layout)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("mode", &self.simulator.mode())
            .field("home", &self.home)
            .field("nvm_dir", &self.nvm_dir)
            .field("executor", &"<dyn Executor>")
            .field("prompter", &"<dyn Prompter>")
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

/// The user's home directory from `$HOME`.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or empty.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME environment variable is not set"))
}

fn nvm_dir_for(home: &Path) -> PathBuf {
    std::env::var_os("NVM_DIR")
        .filter(|d| !d.is_empty())
        .map_or_else(|| home.join(".nvm"), PathBuf::from)
}

impl Context {
    /// Create a context for real execution with system defaults: detected
    /// platform, [`SystemExecutor`], and a defaults-only prompter.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME environment variable is not set.
    pub fn new(settings: Settings, layout: Layout, log: Arc<dyn Log>) -> Result<Self> {
        let home = home_dir()?;
        Ok(Self {
            settings: Arc::new(settings),
            layout,
            platform: Platform::detect(),
            simulator: Simulator::new(Mode::Real, Arc::clone(&log)),
            log,
            nvm_dir: nvm_dir_for(&home),
            home,
            executor: Arc::new(SystemExecutor::default()),
            prompter: Arc::new(DefaultPrompter),
            collector: Arc::new(ErrorCollector::new()),
            parallel: false,
        })
    }

    /// Replace the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.simulator = Simulator::new(mode, Arc::clone(&self.log));
        self
    }

    /// Replace the executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the prompter.
    #[must_use]
    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Replace the platform.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the home directory; the nvm directory follows it to
    /// `<home>/.nvm`.
    #[must_use]
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.nvm_dir = home.join(".nvm");
        self.home = home;
        self
    }

    /// Share `collector` with the caller, which may already hold records
    /// from before the context existed.
    #[must_use]
    pub fn with_collector(mut self, collector: Arc<ErrorCollector>) -> Self {
        self.collector = collector;
        self
    }

    /// Enable or disable parallel reconciliation.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether actions are only being described.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.simulator.is_simulated()
    }

    /// Resolve a yes/no decision under the current mode.
    #[must_use]
    pub fn confirm(&self, question: &str, default: bool) -> bool {
        self.simulator.confirm(question, default, &*self.prompter)
    }

    /// A reconciler for `kind` wired to this context.
    #[must_use]
    pub fn reconciler(&self, kind: ResourceKind) -> Reconciler<'_> {
        Reconciler::new(kind, &self.simulator, &*self.log, &self.collector)
            .parallel(self.parallel)
    }

    /// A shell with nvm loaded.
    #[must_use]
    pub fn nvm(&self) -> NvmShell<'_> {
        NvmShell::new(&self.nvm_dir, &*self.executor)
    }

    /// Where terminal themes are installed.
    #[must_use]
    pub fn themes_dir(&self) -> PathBuf {
        self.home.join(".config").join("devstrap").join("themes")
    }

    /// The zsh rc file holding the managed profile block.
    #[must_use]
    pub fn zshrc(&self) -> PathBuf {
        self.home.join(".zshrc")
    }

    /// VS Code user `settings.json`.
    #[must_use]
    pub fn vscode_settings(&self) -> PathBuf {
        self.platform.vscode_settings_path(&self.home)
    }
}
