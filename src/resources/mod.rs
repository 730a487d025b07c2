//! Idempotent resource primitives.
//!
//! Two shapes live here:
//!
//! - [`Resource`]: a single thing with a checkable state (a settings file, a
//!   shell profile block, a git config key) and an `apply` that converges it.
//! - [`Installer`]: a probe + install capability over item identifiers, used
//!   by the [`Reconciler`](crate::reconcile::Reconciler) for whole lists.
pub mod aws_config;
pub mod brew;
pub mod editor_settings;
pub mod git_config;
pub mod helpers {
    //! Shared helpers for resource implementations.
    pub mod fs;
}
pub mod node;
pub mod npm;
pub mod shell_profile;
pub mod terminal_theme;
pub mod vscode_extension;

use anyhow::{Result, bail};

/// State of a resource.
///
/// # Examples
///
/// ```
/// use devstrap::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "master".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied.
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct.
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A resource that can be checked and converged.
pub trait Resource {
    /// Human-readable description.
    fn description(&self) -> String;

    /// Check the current state of the resource. Never mutates.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Converge the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be made.
    fn apply(&self) -> Result<ResourceChange>;

    /// Whether [`apply`](Self::apply) would change anything.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// Probe + install capability over item identifiers.
pub trait Installer: Send + Sync {
    /// Short name shown in logs (e.g. `"cask"`).
    fn name(&self) -> &str;

    /// Whether `item` is already installed.
    ///
    /// # Errors
    ///
    /// Returns an error if presence cannot be determined.
    fn probe(&self, item: &str) -> Result<bool>;

    /// Install `item`, returning the name of the installer that did it.
    ///
    /// # Errors
    ///
    /// Returns an error if installation fails.
    fn install(&self, item: &str) -> Result<String>;
}

/// Ordered list of installers tried in sequence until one succeeds.
///
/// An item counts as present if any strategy reports it installed.
#[derive(Default)]
pub struct StrategyChain<'a> {
    strategies: Vec<Box<dyn Installer + 'a>>,
}

impl std::fmt::Debug for StrategyChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl<'a> StrategyChain<'a> {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy.
    #[must_use]
    pub fn then(mut self, strategy: impl Installer + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Number of strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the chain has no strategies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Installer for StrategyChain<'_> {
    fn name(&self) -> &str {
        "strategy chain"
    }

    fn probe(&self, item: &str) -> Result<bool> {
        let mut answered = false;
        let mut first_error = None;
        for s in &self.strategies {
            match s.probe(item) {
                Ok(true) => return Ok(true),
                Ok(false) => answered = true,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) if !answered => Err(e),
            _ => Ok(false),
        }
    }

    fn install(&self, item: &str) -> Result<String> {
        if self.strategies.is_empty() {
            bail!("no install strategy available");
        }
        let mut errors = Vec::new();
        for s in &self.strategies {
            match s.install(item) {
                Ok(via) => return Ok(via),
                Err(e) => errors.push(format!("{}: {e:#}", s.name())),
            }
        }
        bail!("all strategies failed ({})", errors.join("; "))
    }
}

/// Shared test helpers for resource unit tests.
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::{HashSet, VecDeque};
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    /// A configurable mock executor.
    ///
    /// Maintains a queue of `(success, stdout)` responses consumed in FIFO
    /// order. When the queue is empty any call returns a failed response.
    /// Every call is recorded as `"program arg1 arg2"`.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        which: Mutex<Option<HashSet<String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// Create a mock with a single failed response.
        #[must_use]
        pub fn fail() -> Self {
            Self::with_responses(vec![(false, String::new())])
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            }
        }

        /// Make [`Executor::which`] return `true` only for `programs`.
        ///
        /// Without this every program is reported missing.
        #[must_use]
        pub fn with_which(self, programs: &[&str]) -> Self {
            *self.which.lock().unwrap() = Some(programs.iter().map(|p| (*p).to_string()).collect());
            self
        }

        /// Every command issued so far.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of commands issued so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn next(&self, program: &str, args: &[&str]) -> (bool, String) {
            let mut line = program.to_string();
            for a in args {
                line.push(' ');
                line.push_str(a);
            }
            self.calls.lock().unwrap().push(line);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| (false, "unexpected call".to_string()))
        }

        fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("mock command failed: {program}")
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.checked(program, args)
        }

        fn run_with_env(
            &self,
            program: &str,
            args: &[&str],
            _: &[(&str, &str)],
        ) -> anyhow::Result<ExecResult> {
            self.checked(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn which(&self, program: &str) -> bool {
            self.which
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|set| set.contains(program))
        }
    }

    /// In-memory [`Installer`](super::Installer) with fixed present and
    /// failing items.
    #[derive(Debug, Default)]
    pub struct FakeInstaller {
        present: HashSet<String>,
        failing: HashSet<String>,
        probe_fails: bool,
        probes: AtomicUsize,
        installed: Mutex<Vec<String>>,
    }

    impl FakeInstaller {
        /// Items in `present` probe as installed; installing `failing` errors.
        #[must_use]
        pub fn new(present: &[&str], failing: &[&str]) -> Self {
            Self {
                present: present.iter().map(|s| (*s).to_string()).collect(),
                failing: failing.iter().map(|s| (*s).to_string()).collect(),
                ..Self::default()
            }
        }

        /// Make every probe return an error.
        #[must_use]
        pub fn failing_probe(mut self) -> Self {
            self.probe_fails = true;
            self
        }

        /// Items installed so far, in order.
        #[must_use]
        pub fn installed(&self) -> Vec<String> {
            self.installed.lock().unwrap().clone()
        }

        /// Number of probes made.
        #[must_use]
        pub fn probes(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    impl super::Installer for FakeInstaller {
        fn name(&self) -> &str {
            "fake"
        }

        fn probe(&self, item: &str) -> anyhow::Result<bool> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.probe_fails {
                anyhow::bail!("probe unavailable");
            }
            Ok(self.present.contains(item))
        }

        fn install(&self, item: &str) -> anyhow::Result<String> {
            if self.failing.contains(item) {
                anyhow::bail!("no such package: {item}");
            }
            self.installed.lock().unwrap().push(item.to_string());
            Ok("fake".to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::test_helpers::FakeInstaller;
    use super::*;

    struct TestResource {
        state: ResourceState,
    }

    impl Resource for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }

        fn apply(&self) -> Result<ResourceChange> {
            Ok(ResourceChange::Applied)
        }
    }

    #[test]
    fn needs_change_for_missing_and_incorrect() {
        for state in [
            ResourceState::Missing,
            ResourceState::Incorrect {
                current: "wrong".to_string(),
            },
        ] {
            assert!(TestResource { state }.needs_change().unwrap());
        }
    }

    #[test]
    fn no_change_for_correct_or_invalid() {
        for state in [
            ResourceState::Correct,
            ResourceState::Invalid {
                reason: "unsupported".to_string(),
            },
        ] {
            assert!(!TestResource { state }.needs_change().unwrap());
        }
    }

    #[test]
    fn chain_tries_strategies_in_order() {
        let chain = StrategyChain::new()
            .then(FakeInstaller::new(&[], &["slack"]))
            .then(FakeInstaller::new(&[], &[]));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.install("slack").unwrap(), "fake");
    }

    #[test]
    fn chain_reports_every_failure() {
        let chain = StrategyChain::new()
            .then(FakeInstaller::new(&[], &["x"]))
            .then(FakeInstaller::new(&[], &["x"]));
        let err = chain.install("x").unwrap_err().to_string();
        assert_eq!(err.matches("no such package").count(), 2, "{err}");
    }

    #[test]
    fn chain_probe_true_if_any_strategy_has_item() {
        let chain = StrategyChain::new()
            .then(FakeInstaller::new(&[], &[]))
            .then(FakeInstaller::new(&["jq"], &[]));
        assert!(chain.probe("jq").unwrap());
        assert!(!chain.probe("wget").unwrap());
    }

    #[test]
    fn chain_probe_tolerates_one_unavailable_strategy() {
        let chain = StrategyChain::new()
            .then(FakeInstaller::new(&[], &[]).failing_probe())
            .then(FakeInstaller::new(&["jq"], &[]));
        assert!(chain.probe("jq").unwrap());
        assert!(!chain.probe("wget").unwrap());
    }

    #[test]
    fn chain_probe_errors_when_no_strategy_answers() {
        let chain = StrategyChain::new().then(FakeInstaller::new(&[], &[]).failing_probe());
        assert!(chain.probe("jq").is_err());
    }

    #[test]
    fn empty_chain_cannot_install() {
        let chain = StrategyChain::new();
        assert!(chain.is_empty());
        assert!(!chain.probe("x").unwrap());
        assert!(chain.install("x").is_err());
    }
}
