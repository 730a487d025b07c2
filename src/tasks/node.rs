use anyhow::Result;

use super::{Confirmation, Context, Task, TaskResult, apply_resource, list_result};
use crate::config::Settings;
use crate::reconcile::ResourceKind;
use crate::resources::node::{NodeInstaller, NvmResource};

/// Install nvm, then the configured Node.js version as the nvm default.
#[derive(Debug)]
pub struct InstallNode;

impl Task for InstallNode {
    fn name(&self) -> &'static str {
        "Install Node.js"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::Runtime.domain()
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Install Node.js via nvm?",
            default: settings.prompts.install_node,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let shell = ctx.nvm();
        apply_resource(ctx, self.domain(), &NvmResource::new(shell))?;

        let spec = ctx.settings.node_version.nvm_spec();
        ctx.log
            .debug(&format!("node version {} (nvm spec {spec})", ctx.settings.node_version));
        let outcomes = ctx
            .reconciler(ResourceKind::Runtime)
            .reconcile([spec], &NodeInstaller::new(shell));
        Ok(list_result(ctx, &outcomes))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use crate::simulate::Mode;
    use crate::tasks::test_helpers::{make_context_with, write};
    use std::sync::Arc;

    #[test]
    fn prompt_default_comes_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context_with(dir.path(), Arc::new(MockExecutor::default()));
        let c = InstallNode.confirmation(&ctx.settings).unwrap();
        assert_eq!(c.default, ctx.settings.prompts.install_node);
    }

    #[test]
    fn dry_run_simulates_nvm_and_node() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::default());
        let (ctx, log) = make_context_with(dir.path(), executor.clone());
        let ctx = ctx.with_mode(Mode::DryRun);
        assert_eq!(InstallNode.run(&ctx).unwrap(), TaskResult::DryRun);
        assert_eq!(executor.call_count(), 0);
        assert!(!ctx.nvm_dir.exists());
        let dry = log.at("dry_run");
        assert_eq!(dry.len(), 2, "{dry:?}");
        assert!(dry[1].contains("node"), "{dry:?}");
    }

    #[test]
    fn installed_nvm_and_node_need_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, "v22.1.0\n".to_string()),
            (true, "v22.1.0\n".to_string()),
        ]));
        let (ctx, _log) = make_context_with(dir.path(), executor.clone());
        write(dir.path(), "home/.nvm/nvm.sh", "");
        assert_eq!(InstallNode.run(&ctx).unwrap(), TaskResult::Ok);
        assert_eq!(executor.call_count(), 2);
        assert_eq!(ctx.collector.finalize().totals().passed, 2);
    }

    #[test]
    fn missing_version_is_installed() {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::with_responses(vec![
            (true, "N/A\n".to_string()),
            (true, String::new()),
        ]));
        let (ctx, _log) = make_context_with(dir.path(), executor.clone());
        write(dir.path(), "home/.nvm/nvm.sh", "");
        InstallNode.run(&ctx).unwrap();
        assert!(executor.calls()[1].contains("nvm alias default 'node'"));
    }
}
