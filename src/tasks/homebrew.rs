use anyhow::Result;

use super::{Context, Task, TaskResult, apply_resource, prerequisite};
use crate::resources::brew::{self, HomebrewResource};

/// Ensure Homebrew is installed. Everything after this depends on it, so a
/// failure stops the run.
#[derive(Debug)]
pub struct InstallHomebrew;

impl Task for InstallHomebrew {
    fn name(&self) -> &'static str {
        "Install Homebrew"
    }

    fn domain(&self) -> &'static str {
        "Homebrew"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = HomebrewResource::new(&*ctx.executor);
        let result = apply_resource(ctx, self.domain(), &resource)
            .map_err(|e| prerequisite("brew", &e))?;
        if result == TaskResult::Ok && brew::locate(&*ctx.executor).is_none() {
            return Err(prerequisite(
                "brew",
                &anyhow::anyhow!("brew not found after running the install script"),
            ));
        }
        Ok(result)
    }
}
