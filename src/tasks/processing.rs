use anyhow::Result;

use super::context::Context;
use crate::config::ItemList;
use crate::error::{ItemListError, TaskError};
use crate::reconcile::Outcome;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use devstrap::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("list not found".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed.
    Ok,
    /// Task had nothing it could do (missing optional input, missing tool).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Wrap an error as a fatal missing-tool condition.
#[must_use]
pub fn prerequisite(tool: &str, err: &anyhow::Error) -> anyhow::Error {
    TaskError::Prerequisite {
        tool: tool.to_string(),
        reason: format!("{err:#}"),
    }
    .into()
}

/// Converge one resource and record the outcome under `domain`.
///
/// The read-only state check runs in every mode; only `apply` is gated by
/// the simulator.
///
/// # Errors
///
/// Returns an error if the state cannot be determined or `apply` fails.
pub fn apply_resource(ctx: &Context, domain: &str, resource: &dyn Resource) -> Result<TaskResult> {
    let desc = resource.description();
    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            ctx.collector.record_pass(domain);
            Ok(TaskResult::Ok)
        }
        ResourceState::Invalid { reason } => {
            ctx.collector.report_warning(domain, format!("{desc}: {reason}"));
            ctx.log.warn(&format!("{desc}: {reason}"));
            Ok(TaskResult::Skipped(reason))
        }
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if let ResourceState::Incorrect { current } = &state {
                ctx.log.debug(&format!("{desc}: {current}"));
            }
            match ctx.simulator.perform(&format!("apply {desc}"), || resource.apply())? {
                None => {
                    ctx.collector.record_simulated(domain);
                    Ok(TaskResult::DryRun)
                }
                Some(ResourceChange::Applied) => {
                    ctx.log.info(&format!("applied {desc}"));
                    ctx.collector.record_pass(domain);
                    Ok(TaskResult::Ok)
                }
                Some(ResourceChange::AlreadyCorrect) => {
                    ctx.collector.record_pass(domain);
                    Ok(TaskResult::Ok)
                }
                Some(ResourceChange::Skipped { reason }) => {
                    ctx.collector.report_warning(domain, format!("{desc}: {reason}"));
                    ctx.log.warn(&format!("{desc}: {reason}"));
                    Ok(TaskResult::Skipped(reason))
                }
            }
        }
    }
}

/// Load an optional item list. A missing file is reported as a warning and
/// yields `None`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_optional_list(
    ctx: &Context,
    domain: &str,
    path: &std::path::Path,
) -> Result<Option<ItemList>> {
    match ItemList::load(path) {
        Ok(list) => Ok(Some(list)),
        Err(e @ ItemListError::Missing { .. }) => {
            ctx.log.warn(&e.to_string());
            ctx.collector.report_missing(domain, e.to_string());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Finish a list-based task.
#[must_use]
pub fn list_result(ctx: &Context, outcomes: &[Outcome]) -> TaskResult {
    if outcomes.is_empty() {
        TaskResult::Skipped("list is empty".to_string())
    } else if ctx.is_dry_run() {
        TaskResult::DryRun
    } else {
        TaskResult::Ok
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::simulate::Mode;
    use crate::tasks::test_helpers::make_context;
    use std::cell::Cell;
    use std::path::Path;

    struct StubResource {
        state: ResourceState,
        change: ResourceChange,
        applied: Cell<bool>,
    }

    impl StubResource {
        fn new(state: ResourceState, change: ResourceChange) -> Self {
            Self {
                state,
                change,
                applied: Cell::new(false),
            }
        }
    }

    impl Resource for StubResource {
        fn description(&self) -> String {
            "stub".to_string()
        }
        fn current_state(&self) -> Result<ResourceState> {
            Ok(self.state.clone())
        }
        fn apply(&self) -> Result<ResourceChange> {
            self.applied.set(true);
            Ok(self.change.clone())
        }
    }

    #[test]
    fn correct_resource_is_a_pass_without_apply() {
        let (ctx, _log) = make_context(Path::new("/repo"));
        let r = StubResource::new(ResourceState::Correct, ResourceChange::Applied);
        assert_eq!(apply_resource(&ctx, "Shell", &r).unwrap(), TaskResult::Ok);
        assert!(!r.applied.get());
        assert_eq!(ctx.collector.finalize().totals().passed, 1);
    }

    #[test]
    fn missing_resource_is_applied() {
        let (ctx, log) = make_context(Path::new("/repo"));
        let r = StubResource::new(ResourceState::Missing, ResourceChange::Applied);
        assert_eq!(apply_resource(&ctx, "Shell", &r).unwrap(), TaskResult::Ok);
        assert!(r.applied.get());
        assert_eq!(log.at("info"), vec!["applied stub"]);
    }

    #[test]
    fn dry_run_never_applies() {
        let (ctx, log) = make_context(Path::new("/repo"));
        let ctx = ctx.with_mode(Mode::DryRun);
        let r = StubResource::new(ResourceState::Missing, ResourceChange::Applied);
        assert_eq!(apply_resource(&ctx, "Shell", &r).unwrap(), TaskResult::DryRun);
        assert!(!r.applied.get());
        assert_eq!(log.at("dry_run"), vec!["would apply stub"]);
        assert_eq!(ctx.collector.finalize().totals().simulated, 1);
    }

    #[test]
    fn invalid_resource_is_a_warning() {
        let (ctx, _log) = make_context(Path::new("/repo"));
        let r = StubResource::new(
            ResourceState::Invalid {
                reason: "not plain JSON".to_string(),
            },
            ResourceChange::Applied,
        );
        assert!(matches!(
            apply_resource(&ctx, "VS Code settings", &r).unwrap(),
            TaskResult::Skipped(_)
        ));
        assert!(!r.applied.get());
        assert_eq!(ctx.collector.finalize().exit_code(), 2);
    }

    #[test]
    fn missing_optional_list_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(dir.path());
        let list = load_optional_list(&ctx, "npm packages", &dir.path().join("none.txt")).unwrap();
        assert!(list.is_none());
        let report = ctx.collector.finalize();
        assert_eq!(report.totals().warned, 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn prerequisite_wraps_task_error() {
        let err = prerequisite("brew", &anyhow::anyhow!("curl failed"));
        assert!(matches!(
            err.downcast_ref::<TaskError>(),
            Some(TaskError::Prerequisite { tool, .. }) if tool == "brew"
        ));
    }
}
