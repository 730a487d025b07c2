//! Outcome accounting and the end-of-run summary.
mod collector;
pub mod summary;

pub use collector::{
    DomainTally, ErrorCollector, ErrorKind, ErrorRecord, RunReport, RunStatus, Severity, Tally,
};
