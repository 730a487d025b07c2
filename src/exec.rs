//! External command execution behind an injectable [`Executor`].
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use crate::error::ExecError;

/// Default upper bound for a single external command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// How often a running child is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so resources can be tested without
/// spawning real commands.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, times out, or exits
    /// with a non-zero status.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with extra environment variables, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, times out, or exits
    /// with a non-zero status.
    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult>;

    /// Run a command, returning its result even when it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or times out.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check whether a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes, each bounded by a timeout.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor {
    timeout: Duration,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SystemExecutor {
    /// Create an executor whose commands are killed after `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The per-command timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program, self.timeout)
    }

    fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        execute_checked(cmd, program, self.timeout)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute(cmd, program, self.timeout)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(cmd: Command, label: &str, timeout: Duration) -> Result<ExecResult> {
    let result = execute(cmd, label, timeout)?;
    if !result.success {
        bail!(ExecError::Failed {
            program: label.to_string(),
            code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        });
    }
    Ok(result)
}

/// Spawn `cmd`, wait at most `timeout` for it, and capture its output.
///
/// The child is killed when the deadline passes.
fn execute(mut cmd: Command, label: &str, timeout: Duration) -> Result<ExecResult> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to execute: {label}"))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("failed to wait for: {label}"))?
        {
            break status;
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().ok();
            bail!(ExecError::TimedOut {
                program: label.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(ExecResult {
        stdout: join(stdout),
        stderr: join(stderr),
        success: status.success(),
        code: status.code(),
    })
}

/// Read a child pipe to completion on a helper thread so a chatty process
/// cannot block on a full pipe while we poll it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).ok();
            String::from_utf8_lossy(&buf).to_string()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
