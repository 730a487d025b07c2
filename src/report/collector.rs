//! Run-scoped error and outcome accounting.
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What went wrong; fixes the record's [`Severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing configuration, or a missing required list.
    Config,
    /// A required external tool is absent and could not be installed.
    Prerequisite,
    /// One item failed to probe or install, or a health check failed.
    ItemFailure,
    /// An optional list or asset is absent; its domain is skipped.
    OptionalResourceMissing,
    /// A degradation that does not count as failure.
    Warning,
}

/// Whether a record stops the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Halts the run after the current step.
    Fatal,
    /// Collected and surfaced in the summary.
    NonFatal,
}

impl ErrorKind {
    /// Severity implied by the kind.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Config | Self::Prerequisite => Severity::Fatal,
            Self::ItemFailure | Self::OptionalResourceMissing | Self::Warning => {
                Severity::NonFatal
            }
        }
    }

    /// Whether a record of this kind counts as a failure (fatal or not).
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Config | Self::Prerequisite | Self::ItemFailure)
    }
}

/// A single collected problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Classification.
    pub kind: ErrorKind,
    /// Provisioning domain or check category that reported it.
    pub domain: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorRecord {
    /// Whether this record stops the run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind.severity(), Severity::Fatal)
    }
}

/// Per-outcome counters.
///
/// # Examples
///
/// ```
/// use devstrap::report::Tally;
///
/// let mut total = Tally { passed: 3, failed: 1, ..Tally::default() };
/// total += Tally { passed: 2, skipped: 1, ..Tally::default() };
/// assert_eq!(total.passed, 5);
/// assert_eq!(total.skipped, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Items already correct or changed successfully.
    pub passed: usize,
    /// Items that would have changed in dry-run mode.
    pub simulated: usize,
    /// Warnings.
    pub warned: usize,
    /// Failures.
    pub failed: usize,
    /// Domains or items skipped by choice or inapplicability.
    pub skipped: usize,
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.simulated += other.simulated;
        self.warned += other.warned;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Counters for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTally {
    /// Domain name, e.g. `"Applications"`.
    pub domain: String,
    /// Its counters.
    pub tally: Tally,
}

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No failures or warnings.
    Clean,
    /// At least one failure (fatal or per-item).
    Failed,
    /// Warnings only.
    Warnings,
}

impl RunStatus {
    /// Process exit code: 0, 1 or 2.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Failed => 1,
            Self::Warnings => 2,
        }
    }
}

/// Immutable result of a run, produced by [`ErrorCollector::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    domains: Vec<DomainTally>,
    records: Vec<ErrorRecord>,
}

impl RunReport {
    /// Per-domain counters in first-reported order.
    #[must_use]
    pub fn domains(&self) -> &[DomainTally] {
        &self.domains
    }

    /// Every record in the order reported.
    #[must_use]
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Sum of all domain counters.
    #[must_use]
    pub fn totals(&self) -> Tally {
        let mut total = Tally::default();
        for d in &self.domains {
            total += d.tally;
        }
        total
    }

    /// Failure records, fatal ones included.
    pub fn failures(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter().filter(|r| r.kind.is_failure())
    }

    /// Warning records.
    pub fn warnings(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter().filter(|r| !r.kind.is_failure())
    }

    /// Overall status: any failure wins over warnings.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        if self.failures().next().is_some() {
            RunStatus::Failed
        } else if self.warnings().next().is_some() {
            RunStatus::Warnings
        } else {
            RunStatus::Clean
        }
    }

    /// Shorthand for `self.status().exit_code()`.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.status().exit_code()
    }
}

#[derive(Debug, Default)]
struct Inner {
    domains: Vec<DomainTally>,
    records: Vec<ErrorRecord>,
}

impl Inner {
    fn bump(&mut self, domain: &str, f: impl FnOnce(&mut Tally)) {
        if let Some(d) = self.domains.iter_mut().find(|d| d.domain == domain) {
            f(&mut d.tally);
            return;
        }
        let mut tally = Tally::default();
        f(&mut tally);
        self.domains.push(DomainTally {
            domain: domain.to_string(),
            tally,
        });
    }
}

/// Thread-safe accumulator for one run's outcomes.
///
/// Reporting never unwinds control: callers check [`has_fatal`] after each
/// step and stop themselves.
///
/// [`has_fatal`]: ErrorCollector::has_fatal
///
/// # Examples
///
/// ```
/// use devstrap::report::{ErrorCollector, RunStatus};
///
/// let collector = ErrorCollector::new();
/// collector.record_pass("Applications");
/// collector.report_warning("npm packages", "list not found");
/// assert!(!collector.has_fatal());
/// assert_eq!(collector.finalize().status(), RunStatus::Warnings);
/// ```
#[derive(Debug, Default)]
pub struct ErrorCollector {
    inner: Mutex<Inner>,
}

impl ErrorCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record of any kind and count it against `domain`.
    pub fn report(&self, kind: ErrorKind, domain: &str, message: impl Into<String>) {
        let mut inner = self.lock();
        inner.bump(domain, |t| {
            if kind.is_failure() {
                t.failed += 1;
            } else {
                t.warned += 1;
            }
        });
        inner.records.push(ErrorRecord {
            kind,
            domain: domain.to_string(),
            message: message.into(),
        });
    }

    /// Report a condition that stops the run.
    ///
    /// `kind` is expected to be [`ErrorKind::Config`] or
    /// [`ErrorKind::Prerequisite`]; severity always follows the kind.
    pub fn report_fatal(&self, kind: ErrorKind, domain: &str, message: impl Into<String>) {
        self.report(kind, domain, message);
    }

    /// Report a non-fatal per-item failure.
    pub fn report_failure(&self, domain: &str, message: impl Into<String>) {
        self.report(ErrorKind::ItemFailure, domain, message);
    }

    /// Report a non-fatal warning.
    pub fn report_warning(&self, domain: &str, message: impl Into<String>) {
        self.report(ErrorKind::Warning, domain, message);
    }

    /// Report an absent optional list or asset.
    pub fn report_missing(&self, domain: &str, message: impl Into<String>) {
        self.report(ErrorKind::OptionalResourceMissing, domain, message);
    }

    /// Count an item that is correct or was changed successfully.
    pub fn record_pass(&self, domain: &str) {
        self.lock().bump(domain, |t| t.passed += 1);
    }

    /// Count an item that would change in dry-run mode.
    pub fn record_simulated(&self, domain: &str) {
        self.lock().bump(domain, |t| t.simulated += 1);
    }

    /// Count a domain or item skipped by choice.
    pub fn record_skip(&self, domain: &str) {
        self.lock().bump(domain, |t| t.skipped += 1);
    }

    /// Whether any fatal record has been reported.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.lock().records.iter().any(ErrorRecord::is_fatal)
    }

    /// Snapshot the collected state into a [`RunReport`].
    #[must_use]
    pub fn finalize(&self) -> RunReport {
        let inner = self.lock();
        RunReport {
            domains: inner.domains.clone(),
            records: inner.records.clone(),
        }
    }
}
