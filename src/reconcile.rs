//! Desired-versus-actual reconciliation of item lists.
use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::logging::Log;
use crate::report::ErrorCollector;
use crate::resources::Installer;
use crate::simulate::Simulator;

/// The kind of thing a list names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A Homebrew cask or formula.
    Application,
    /// A global npm package.
    NpmPackage,
    /// A VS Code extension.
    VsCodeExtension,
    /// A language runtime managed by a version manager.
    Runtime,
}

impl ResourceKind {
    /// Domain name used in logs and the summary.
    #[must_use]
    pub const fn domain(self) -> &'static str {
        match self {
            Self::Application => "Applications",
            Self::NpmPackage => "npm packages",
            Self::VsCodeExtension => "VS Code extensions",
            Self::Runtime => "Node.js",
        }
    }

    /// Singular noun for one item.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::NpmPackage => "npm package",
            Self::VsCodeExtension => "extension",
            Self::Runtime => "runtime",
        }
    }
}

/// What reconciliation did for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Already present.
    None,
    /// Installed by the named strategy.
    Installed {
        /// Installer that succeeded.
        via: String,
    },
    /// Dry run: would have been installed.
    WouldInstall,
    /// Probe or install failed.
    Failed {
        /// Error chain.
        reason: String,
    },
}

/// Result of reconciling one item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    item: String,
    actual: Option<bool>,
    action: Action,
    at: DateTime<Utc>,
}

impl Outcome {
    fn new(item: &str, actual: Option<bool>, action: Action) -> Self {
        Self {
            item: item.to_string(),
            actual,
            action,
            at: Utc::now(),
        }
    }

    /// Item identifier.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Desired presence; reconciliation only ever installs.
    #[must_use]
    pub const fn desired(&self) -> bool {
        true
    }

    /// Probed presence before any action, `None` when not probed.
    #[must_use]
    pub const fn actual(&self) -> Option<bool> {
        self.actual
    }

    /// What was done.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }

    /// When the outcome was recorded.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// Whether the item failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.action, Action::Failed { .. })
    }
}

/// One-line count of a batch, e.g. `2 installed, 5 already installed`.
///
/// # Examples
///
/// ```
/// use devstrap::reconcile::summarize;
///
/// assert_eq!(summarize(&[]), "nothing to do");
/// ```
#[must_use]
pub fn summarize(outcomes: &[Outcome]) -> String {
    let count = |f: fn(&Action) -> bool| outcomes.iter().filter(|o| f(&o.action)).count();
    let parts = [
        (count(|a| matches!(a, Action::Installed { .. })), "installed"),
        (count(|a| matches!(a, Action::None)), "already installed"),
        (count(|a| matches!(a, Action::WouldInstall)), "would install"),
        (count(|a| matches!(a, Action::Failed { .. })), "failed"),
    ];
    let text: Vec<String> = parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect();
    if text.is_empty() {
        "nothing to do".to_string()
    } else {
        text.join(", ")
    }
}

/// Reconciles the items of one [`ResourceKind`] against an [`Installer`].
pub struct Reconciler<'a> {
    kind: ResourceKind,
    simulator: &'a Simulator,
    log: &'a dyn Log,
    collector: &'a ErrorCollector,
    parallel: bool,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("kind", &self.kind)
            .field("simulator", self.simulator)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    /// Create a sequential reconciler.
    #[must_use]
    pub fn new(
        kind: ResourceKind,
        simulator: &'a Simulator,
        log: &'a dyn Log,
        collector: &'a ErrorCollector,
    ) -> Self {
        Self {
            kind,
            simulator,
            log,
            collector,
            parallel: false,
        }
    }

    /// Reconcile items concurrently (outcome order is still source order).
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reconcile every item independently and return one outcome per item,
    /// in source order.
    ///
    /// In dry-run mode nothing is probed or installed. In real mode a
    /// failing item is reported to the collector and the batch continues.
    #[must_use]
    pub fn reconcile<'i>(
        &self,
        items: impl IntoIterator<Item = &'i str>,
        installer: &dyn Installer,
    ) -> Vec<Outcome> {
        let items: Vec<&str> = items.into_iter().collect();
        let outcomes: Vec<Outcome> = if self.parallel && items.len() > 1 {
            items
                .par_iter()
                .map(|item| self.reconcile_one(item, installer))
                .collect()
        } else {
            items
                .iter()
                .map(|item| self.reconcile_one(item, installer))
                .collect()
        };
        self.log.info(&summarize(&outcomes));
        outcomes
    }

    fn reconcile_one(&self, item: &str, installer: &dyn Installer) -> Outcome {
        let domain = self.kind.domain();
        let noun = self.kind.noun();

        if self.simulator.is_simulated() {
            self.log.dry_run(&format!("would install {noun} {item}"));
            self.collector.record_simulated(domain);
            return Outcome::new(item, None, Action::WouldInstall);
        }

        match installer.probe(item) {
            Ok(true) => {
                self.log.debug(&format!("{noun} already installed: {item}"));
                self.collector.record_pass(domain);
                Outcome::new(item, Some(true), Action::None)
            }
            Ok(false) => match installer.install(item) {
                Ok(via) => {
                    self.log.info(&format!("installed {noun} {item} ({via})"));
                    self.collector.record_pass(domain);
                    Outcome::new(item, Some(false), Action::Installed { via })
                }
                Err(e) => self.fail(item, Some(false), &format!("install failed: {e:#}")),
            },
            Err(e) => self.fail(item, None, &format!("probe failed: {e:#}")),
        }
    }

    fn fail(&self, item: &str, actual: Option<bool>, reason: &str) -> Outcome {
        let message = format!("{item}: {reason}");
        self.log.error(&message);
        self.collector.report_failure(self.kind.domain(), &message);
        Outcome::new(
            item,
            actual,
            Action::Failed {
                reason: reason.to_string(),
            },
        )
    }
}
