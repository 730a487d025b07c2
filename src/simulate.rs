//! Dry-run simulation and operator decisions.
//!
//! Every mutating action goes through [`Simulator::perform`], and every
//! yes/no question through [`decide`], so a dry run neither changes the
//! system nor blocks on input.
use std::io::{BufRead as _, IsTerminal as _, Write as _};
use std::sync::Arc;

use anyhow::Result;

use crate::logging::Log;

/// Whether actions execute or are only described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Execute actions.
    #[default]
    Real,
    /// Log actions without executing them.
    DryRun,
}

impl Mode {
    /// `DryRun` when `dry_run` is set.
    #[must_use]
    pub const fn from_flag(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Real }
    }
}

/// Interactive input source.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; `default` is the answer for empty input.
    fn confirm(&self, question: &str, default: bool) -> bool;

    /// Ask for a line of text; `default` is returned for empty input.
    fn input(&self, question: &str, default: &str) -> String;
}

/// Prompter that answers every question with its default.
///
/// Used for `--yes` and whenever standard input is not a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrompter;

impl Prompter for DefaultPrompter {
    fn confirm(&self, _question: &str, default: bool) -> bool {
        default
    }

    fn input(&self, _question: &str, default: &str) -> String {
        default.to_string()
    }
}

/// Prompter that reads answers from the terminal.
///
/// Falls back to defaults when standard input is not a TTY.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

/// Attempts before an unrecognised answer falls back to the default.
const MAX_ATTEMPTS: usize = 3;

impl TerminalPrompter {
    #[allow(clippy::print_stdout)]
    fn read_line(prompt: &str) -> Option<String> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        print!("{prompt}");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Prompter for TerminalPrompter {
    #[allow(clippy::print_stdout)]
    fn confirm(&self, question: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        for _ in 0..MAX_ATTEMPTS {
            let Some(line) = Self::read_line(&format!("{question} {hint} ")) else {
                return default;
            };
            if let Some(answer) = parse_answer(&line, default) {
                return answer;
            }
            println!("Please answer yes or no.");
        }
        default
    }

    fn input(&self, question: &str, default: &str) -> String {
        let prompt = if default.is_empty() {
            format!("{question}: ")
        } else {
            format!("{question} [{default}]: ")
        };
        match Self::read_line(&prompt) {
            Some(line) if !line.is_empty() => line,
            _ => default.to_string(),
        }
    }
}

/// Interpret a yes/no answer; `None` if unrecognised.
fn parse_answer(line: &str, default: bool) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Resolve a yes/no decision.
///
/// In simulation the default is used without asking; otherwise the
/// `prompter` is consulted.
///
/// # Examples
///
/// ```
/// use devstrap::simulate::{DefaultPrompter, decide};
///
/// assert!(decide("Install Node.js?", true, true, &DefaultPrompter));
/// assert!(!decide("Install Node.js?", false, false, &DefaultPrompter));
/// ```
pub fn decide(question: &str, default: bool, simulated: bool, prompter: &dyn Prompter) -> bool {
    if simulated {
        default
    } else {
        prompter.confirm(question, default)
    }
}

/// Gate for side effects under the current [`Mode`].
#[derive(Clone)]
pub struct Simulator {
    mode: Mode,
    log: Arc<dyn Log>,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("mode", &self.mode)
            .field("log", &"<dyn Log>")
            .finish()
    }
}

impl Simulator {
    /// Create a simulator that logs through `log`.
    #[must_use]
    pub fn new(mode: Mode, log: Arc<dyn Log>) -> Self {
        Self { mode, log }
    }

    /// The current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether actions are only being described.
    #[must_use]
    pub const fn is_simulated(&self) -> bool {
        matches!(self.mode, Mode::DryRun)
    }

    /// Run `action`, or in dry-run mode log `would <description>` instead.
    ///
    /// Returns `Ok(None)` when the action was simulated.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `action`.
    pub fn perform<T>(
        &self,
        description: &str,
        action: impl FnOnce() -> Result<T>,
    ) -> Result<Option<T>> {
        match self.mode {
            Mode::DryRun => {
                self.log.dry_run(&format!("would {description}"));
                Ok(None)
            }
            Mode::Real => {
                self.log.debug(description);
                action().map(Some)
            }
        }
    }

    /// [`decide`] under this simulator's mode.
    pub fn confirm(&self, question: &str, default: bool, prompter: &dyn Prompter) -> bool {
        decide(question, default, self.is_simulated(), prompter)
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::test_helpers::RecordingLog;
    use super::*;
    use std::cell::Cell;

    #[test]
    fn decide_simulated_uses_default_without_asking() {
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().never();
        assert!(decide("Install?", true, true, &prompter));
        assert!(!decide("Install?", false, true, &prompter));
    }

    #[test]
    fn decide_real_asks_prompter() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_confirm()
            .withf(|q, d| q == "Install Node.js?" && *d)
            .times(1)
            .return_const(false);
        assert!(!decide("Install Node.js?", true, false, &prompter));
    }

    #[test]
    fn default_prompter_returns_defaults() {
        assert!(DefaultPrompter.confirm("q", true));
        assert!(!DefaultPrompter.confirm("q", false));
        assert_eq!(DefaultPrompter.input("name", "Ada"), "Ada");
    }

    #[test]
    fn parse_answer_variants() {
        assert_eq!(parse_answer("", true), Some(true));
        assert_eq!(parse_answer("", false), Some(false));
        assert_eq!(parse_answer("Y", false), Some(true));
        assert_eq!(parse_answer(" yes ", false), Some(true));
        assert_eq!(parse_answer("no", true), Some(false));
        assert_eq!(parse_answer("maybe", true), None);
    }

    #[test]
    fn perform_dry_run_skips_action_and_logs() {
        let log = Arc::new(RecordingLog::default());
        let sim = Simulator::new(Mode::DryRun, log.clone());
        let ran = Cell::new(false);
        let out = sim
            .perform("install git", || {
                ran.set(true);
                Ok(1)
            })
            .unwrap();
        assert_eq!(out, None);
        assert!(!ran.get());
        assert_eq!(log.at("dry_run"), vec!["would install git"]);
    }

    #[test]
    fn perform_real_runs_action() {
        let log = Arc::new(RecordingLog::default());
        let sim = Simulator::new(Mode::Real, log.clone());
        assert_eq!(sim.perform("install git", || Ok(7)).unwrap(), Some(7));
        assert!(log.at("dry_run").is_empty());
    }

    #[test]
    fn perform_real_propagates_errors() {
        let sim = Simulator::new(Mode::Real, Arc::new(RecordingLog::default()));
        let err = sim
            .perform::<()>("install git", || anyhow::bail!("boom"))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn mode_from_flag() {
        assert_eq!(Mode::from_flag(true), Mode::DryRun);
        assert_eq!(Mode::from_flag(false), Mode::Real);
        assert!(Simulator::new(Mode::DryRun, Arc::new(RecordingLog::default())).is_simulated());
    }
}
