use anyhow::{Context as _, Result};

use super::{Confirmation, Context, Task, TaskResult, apply_resource};
use crate::config::Settings;
use crate::resources::shell_profile::ShellProfileResource;

/// Keep `shell/profile.sh` inside a managed block of `~/.zshrc`.
#[derive(Debug)]
pub struct ConfigureShellProfile;

impl Task for ConfigureShellProfile {
    fn name(&self) -> &'static str {
        "Configure shell profile"
    }

    fn domain(&self) -> &'static str {
        "Shell profile"
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Customize the shell profile?",
            default: settings.prompts.customize_shell,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let source = ctx.layout.shell_profile();
        if !source.is_file() {
            let message = format!("profile snippet not found: {}", source.display());
            ctx.log.warn(&message);
            ctx.collector.report_missing(self.domain(), message);
            return Ok(TaskResult::Skipped("no shell profile snippet".to_string()));
        }
        let snippet = std::fs::read_to_string(&source)
            .with_context(|| format!("reading {}", source.display()))?;
        apply_resource(
            ctx,
            self.domain(),
            &ShellProfileResource::new(ctx.zshrc(), &snippet),
        )
    }
}
