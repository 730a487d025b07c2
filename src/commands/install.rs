//! Command: provision the workstation.
use std::sync::Arc;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Log;
use crate::reconcile::ResourceKind;
use crate::report::{ErrorCollector, ErrorKind, RunReport};
use crate::tasks::{self, Context};

/// Run the install command.
///
/// Configuration problems and a missing application list stop the run
/// before any provisioning; the returned report carries them.
#[must_use]
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<dyn Log>) -> RunReport {
    let collector = Arc::new(ErrorCollector::new());
    let Some(setup) = super::CommandSetup::init(global, log.as_ref(), &collector) else {
        return collector.finalize();
    };

    let apps = setup.layout.apps();
    if !apps.is_file() {
        let message = format!("required list not found: {}", apps.display());
        log.error(&message);
        collector.report_fatal(
            ErrorKind::Config,
            ResourceKind::Application.domain(),
            message,
        );
        return collector.finalize();
    }

    match setup.into_context(global, log, Arc::clone(&collector)) {
        Some(ctx) => provision(&ctx, opts),
        None => collector.finalize(),
    }
}

/// Run the provisioning tasks selected by `--only` / `--skip` against `ctx`.
#[must_use]
pub fn provision(ctx: &Context, opts: &InstallOpts) -> RunReport {
    let selected = tasks::select(tasks::all_provision_tasks(), &opts.only, &opts.skip);
    ctx.log.debug(&format!(
        "running {} of {} tasks",
        selected.len(),
        tasks::all_provision_tasks().len()
    ));
    super::run_tasks_to_completion(&selected, ctx)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::test_helpers::{global_for, sample_root};
    use crate::resources::test_helpers::MockExecutor;
    use crate::simulate::Mode;
    use crate::simulate::test_helpers::RecordingLog;
    use crate::tasks::test_helpers::{make_context_with, write};

    #[test]
    fn missing_apps_list_is_fatal_before_any_task() {
        let (_dir, root) = sample_root();
        let log: Arc<dyn Log> = Arc::new(RecordingLog::default());
        let report = run(&global_for(&root), &InstallOpts::default(), &log);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.records().len(), 1);
        assert_eq!(report.records()[0].kind, ErrorKind::Config);
        assert!(report.records()[0].message.contains("apps.txt"));
    }

    #[test]
    fn invalid_settings_stop_before_provisioning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "setup.conf", "VSCODE_FONT_SIZE=99\n");
        write(dir.path(), "lists/apps.txt", "git\n");
        let log: Arc<dyn Log> = Arc::new(RecordingLog::default());
        let report = run(&global_for(dir.path()), &InstallOpts::default(), &log);
        assert_eq!(report.exit_code(), 1);
        assert!(report.records().iter().all(|r| r.kind == ErrorKind::Config));
    }

    #[test]
    fn provision_dry_run_issues_no_commands() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lists/apps.txt", "git\nwget\n");
        write(dir.path(), "lists/npm-packages.txt", "typescript\n");
        let executor = Arc::new(MockExecutor::default());
        let (ctx, _log) = make_context_with(dir.path(), executor.clone());
        let ctx = ctx.with_mode(Mode::DryRun);

        let report = provision(&ctx, &InstallOpts::default());

        assert_eq!(executor.call_count(), 0, "{:?}", executor.calls());
        assert!(!ctx.home.exists(), "dry run must not create files");
        assert!(report.totals().simulated >= 3);
        assert_eq!(report.totals().failed, 0);
    }

    #[test]
    fn provision_honours_only_filter() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::default());
        let (ctx, log) = make_context_with(dir.path(), executor);
        let opts = InstallOpts {
            only: vec!["shell".to_string()],
            skip: vec![],
        };
        provision(&ctx, &opts);
        assert_eq!(log.at("stage"), vec!["Configure shell profile"]);
    }
}
