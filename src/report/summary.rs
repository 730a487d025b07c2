//! Plain-text rendering of a [`RunReport`].
use std::fmt::Write as _;

use super::collector::{ErrorRecord, RunReport, RunStatus, Tally};

fn counts(t: &Tally) -> String {
    format!(
        "{} passed, {} simulated, {} warned, {} failed, {} skipped",
        t.passed, t.simulated, t.warned, t.failed, t.skipped
    )
}

fn section<'a>(out: &mut String, title: &str, records: impl Iterator<Item = &'a ErrorRecord>) {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for r in records {
        if let Some((_, messages)) = groups.iter_mut().find(|(d, _)| *d == r.domain) {
            messages.push(r.message.as_str());
        } else {
            groups.push((r.domain.as_str(), vec![r.message.as_str()]));
        }
    }
    if groups.is_empty() {
        return;
    }
    writeln!(out, "\n{title}:").ok();
    for (domain, messages) in groups {
        writeln!(out, "  {domain}:").ok();
        for m in messages {
            writeln!(out, "    - {m}").ok();
        }
    }
}

/// Render per-domain tallies, a totals line, failures and warnings grouped
/// by domain, and the final result.
///
/// Pure and deterministic: the same report always renders the same text.
#[must_use]
pub fn render(report: &RunReport) -> String {
    let width = report
        .domains()
        .iter()
        .map(|d| d.domain.chars().count())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    let mut out = String::new();
    for d in report.domains() {
        writeln!(out, "{:<width$}  {}", d.domain, counts(&d.tally)).ok();
    }
    writeln!(out, "{:<width$}  {}", "Total", counts(&report.totals())).ok();

    section(&mut out, "Failures", report.failures());
    section(&mut out, "Warnings", report.warnings());

    let result = match report.status() {
        RunStatus::Clean => "clean",
        RunStatus::Failed => "failed",
        RunStatus::Warnings => "warnings",
    };
    writeln!(out, "\nResult: {result} (exit {})", report.exit_code()).ok();
    out
}
