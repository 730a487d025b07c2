use anyhow::Result;

use super::{Confirmation, Context, Task, TaskResult, list_result, load_optional_list};
use crate::config::Settings;
use crate::reconcile::ResourceKind;
use crate::resources::npm::NpmInstaller;

/// Install the global npm packages in `lists/npm-packages.txt`.
#[derive(Debug)]
pub struct InstallNpmPackages;

impl Task for InstallNpmPackages {
    fn name(&self) -> &'static str {
        "Install npm packages"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::NpmPackage.domain()
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Install global npm packages?",
            default: settings.prompts.install_npm_packages,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(list) = load_optional_list(ctx, self.domain(), &ctx.layout.npm_packages())? else {
            return Ok(TaskResult::Skipped("no npm package list".to_string()));
        };

        let nvm = ctx.nvm();
        let npm_available = ctx.executor.which("npm") || nvm.is_installed();
        if !npm_available && !ctx.is_dry_run() {
            ctx.log.warn("npm not found; install Node.js first");
            ctx.collector
                .report_warning(self.domain(), "npm not found; packages not installed");
            return Ok(TaskResult::Skipped("npm not found".to_string()));
        }

        let installer = NpmInstaller::new(&*ctx.executor, Some(nvm).filter(|s| s.is_installed()));
        let outcomes = ctx
            .reconciler(ResourceKind::NpmPackage)
            .reconcile(&list, &installer);
        Ok(list_result(ctx, &outcomes))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{make_context_with, write};
    use std::sync::Arc;

    #[test]
    fn missing_list_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context_with(dir.path(), Arc::new(MockExecutor::default()));
        assert!(matches!(
            InstallNpmPackages.run(&ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
        let report = ctx.collector.finalize();
        assert_eq!(report.exit_code(), 2);
        assert!(report.records()[0].message.contains("npm-packages.txt"));
    }

    #[test]
    fn missing_npm_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lists/npm-packages.txt", "typescript\n");
        let executor = Arc::new(MockExecutor::default());
        let (ctx, _log) = make_context_with(dir.path(), executor.clone());
        InstallNpmPackages.run(&ctx).unwrap();
        assert_eq!(executor.call_count(), 0);
        assert_eq!(ctx.collector.finalize().exit_code(), 2);
    }

    #[test]
    fn installs_missing_packages() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "lists/npm-packages.txt",
            "typescript\n--- IGNORE ---\neslint\n",
        );
        let executor = Arc::new(
            MockExecutor::with_responses(vec![
                (true, r#"{"dependencies":{"typescript":{}}}"#.to_string()),
                (true, String::new()),
            ])
            .with_which(&["npm"]),
        );
        let (ctx, _log) = make_context_with(dir.path(), executor.clone());
        assert_eq!(InstallNpmPackages.run(&ctx).unwrap(), TaskResult::Ok);
        assert_eq!(executor.calls()[1], "npm install -g eslint");
        assert_eq!(ctx.collector.finalize().totals().passed, 2);
    }
}
