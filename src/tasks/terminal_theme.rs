use anyhow::Result;

use super::{Confirmation, Context, Task, TaskResult, apply_resource};
use crate::config::Settings;
use crate::resources::terminal_theme::TerminalThemeResource;

/// Install `themes/terminal.terminal` and, on macOS, import it.
#[derive(Debug)]
pub struct InstallTerminalTheme;

impl Task for InstallTerminalTheme {
    fn name(&self) -> &'static str {
        "Install terminal theme"
    }

    fn domain(&self) -> &'static str {
        "Terminal theme"
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Install the terminal theme?",
            default: settings.prompts.install_terminal_theme,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let source = ctx.layout.terminal_theme();
        if !source.is_file() {
            let message = format!("theme not found: {}", source.display());
            ctx.log.warn(&message);
            ctx.collector.report_missing(self.domain(), message);
            return Ok(TaskResult::Skipped("no terminal theme".to_string()));
        }
        let resource = TerminalThemeResource::new(
            &source,
            &ctx.themes_dir(),
            ctx.platform.is_macos(),
            &*ctx.executor,
        )?;
        apply_resource(ctx, self.domain(), &resource)
    }
}
