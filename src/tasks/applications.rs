use anyhow::Result;

use super::{Context, Task, TaskResult, list_result, prerequisite};
use crate::config::ItemList;
use crate::reconcile::ResourceKind;
use crate::resources::StrategyChain;
use crate::resources::brew::{self, BrewInstaller, BrewKind};

/// Casks first where the platform supports them, then formulae.
#[must_use]
pub fn app_installer<'a>(ctx: &'a Context, brew: &str) -> StrategyChain<'a> {
    let mut chain = StrategyChain::new();
    if ctx.platform.supports_casks() {
        chain = chain.then(BrewInstaller::new(BrewKind::Cask, brew, &*ctx.executor));
    }
    chain.then(BrewInstaller::new(BrewKind::Formula, brew, &*ctx.executor))
}

/// Install every application in `lists/apps.txt`, as a cask where casks are
/// supported and as a formula otherwise.
#[derive(Debug)]
pub struct InstallApplications;

impl Task for InstallApplications {
    fn name(&self) -> &'static str {
        "Install applications"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::Application.domain()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let list = ItemList::load(&ctx.layout.apps())?;

        let brew = match brew::locate(&*ctx.executor) {
            Some(path) => path,
            None if ctx.is_dry_run() => "brew".to_string(),
            None => {
                return Err(prerequisite("brew", &anyhow::anyhow!("brew is not on PATH")));
            }
        };
        ctx.log.debug(&format!("using {brew}"));

        let chain = app_installer(ctx, &brew);
        let outcomes = ctx
            .reconciler(ResourceKind::Application)
            .reconcile(&list, &chain);
        Ok(list_result(ctx, &outcomes))
    }
}
