// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed repository, a scripted executor that
// never spawns processes, and a builder for the task context.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use devstrap::config::{Layout, Settings};
use devstrap::error::ExecError;
use devstrap::exec::{ExecResult, Executor};
use devstrap::logging::Log;
use devstrap::platform::{Os, Platform};
use devstrap::simulate::Mode;
use devstrap::tasks::Context;

/// A complete, valid settings document.
pub const VALID_SETTINGS: &str = "\
VSCODE_FONT_SIZE=14
VSCODE_TAB_SIZE=2
VSCODE_COLOR_THEME=\"Default Dark Modern\"
VSCODE_ICON_THEME=vs-seti
VSCODE_FORMAT_ON_SAVE=true
VSCODE_AUTO_SAVE=afterDelay
VSCODE_DEFAULT_FORMATTER=esbenp.prettier-vscode
VSCODE_WORD_WRAP=on
DEFAULT_INSTALL_NODE=yes
DEFAULT_INSTALL_NPM_PACKAGES=yes
DEFAULT_CONFIGURE_VSCODE=yes
DEFAULT_INSTALL_TERMINAL_THEME=no
DEFAULT_CUSTOMIZE_SHELL=yes
GIT_DEFAULT_BRANCH=main
NODE_VERSION=20
";

/// A log that discards everything.
#[derive(Debug, Default)]
pub struct NullLog;

impl Log for NullLog {
    fn stage(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
    fn dry_run(&self, _msg: &str) {}
}

/// Executor answering from a script instead of spawning processes.
///
/// Every command line (`program arg arg…`) is recorded. A line containing
/// one of the `failing` fragments exits 1; otherwise the stdout of the first
/// matching `outputs` prefix is returned (empty when none match).
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    on_path: HashSet<String>,
    failing: Vec<String>,
    outputs: Vec<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Programs that `which` finds.
    pub fn with_path(mut self, programs: &[&str]) -> Self {
        self.on_path
            .extend(programs.iter().map(|p| (*p).to_string()));
        self
    }

    /// Command lines containing `fragment` exit 1.
    pub fn failing(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    /// Command lines starting with `prefix` print `stdout`.
    pub fn output(mut self, prefix: &str, stdout: &str) -> Self {
        self.outputs.push((prefix.to_string(), stdout.to_string()));
        self
    }

    /// Every command line issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        if self.failing.iter().any(|f| line.contains(f.as_str())) {
            return ExecResult {
                stderr: format!("{program}: scripted failure"),
                code: Some(1),
                ..ExecResult::default()
            };
        }
        let stdout = self
            .outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        ExecResult {
            stdout,
            success: true,
            code: Some(0),
            ..ExecResult::default()
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.respond(program, args);
        if result.success {
            Ok(result)
        } else {
            Err(ExecError::Failed {
                program: program.to_string(),
                code: result.code.unwrap_or(-1),
                stderr: result.stderr,
            }
            .into())
        }
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        self.run(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.respond(program, args))
    }

    fn which(&self, program: &str) -> bool {
        self.on_path.contains(program)
    }
}

/// An isolated repository backed by a [`tempfile::TempDir`], with a home
/// directory at `<root>/home`.
pub struct TestRepo {
    /// Temporary directory containing the repository.
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// A repository holding only a valid `setup.conf`.
    pub fn new() -> Self {
        let repo = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        repo.write("setup.conf", VALID_SETTINGS);
        repo
    }

    /// Path to the repository root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The home directory handed to the context.
    pub fn home(&self) -> PathBuf {
        self.root().join("home")
    }

    /// Write `content` to `rel` under the root, creating directories.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write file");
        self
    }

    /// Load the settings and build a Linux context around `executor`.
    pub fn context(&self, executor: Arc<dyn Executor>, mode: Mode) -> Context {
        let layout = Layout::new(self.root());
        let settings = Settings::load(&layout.settings()).expect("load settings");
        Context::new(settings, layout, Arc::new(NullLog))
            .expect("context")
            .with_home(self.home())
            .with_platform(Platform::new(Os::Linux))
            .with_executor(executor)
            .with_mode(mode)
    }
}
