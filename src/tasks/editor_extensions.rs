use anyhow::Result;

use super::{Confirmation, Context, Task, TaskResult, list_result, load_optional_list};
use crate::config::Settings;
use crate::reconcile::ResourceKind;
use crate::resources::vscode_extension::{VsCodeExtensionInstaller, find_code_command};

/// Install VS Code extensions listed in `lists/vscode-extensions.txt`.
#[derive(Debug)]
pub struct InstallEditorExtensions;

impl Task for InstallEditorExtensions {
    fn name(&self) -> &'static str {
        "Install VS Code extensions"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::VsCodeExtension.domain()
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Install VS Code extensions?",
            default: settings.prompts.configure_vscode,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(list) =
            load_optional_list(ctx, self.domain(), &ctx.layout.vscode_extensions())?
        else {
            return Ok(TaskResult::Skipped("no extension list".to_string()));
        };

        let cmd = match find_code_command(&*ctx.executor) {
            Some(cmd) => cmd,
            None if ctx.is_dry_run() => "code".to_string(),
            None => {
                ctx.log.warn("neither code-insiders nor code found in PATH");
                ctx.collector
                    .report_warning(self.domain(), "VS Code CLI not found");
                return Ok(TaskResult::Skipped("VS Code CLI not found".to_string()));
            }
        };
        ctx.log.debug(&format!("using VS Code CLI: {cmd}"));

        let installer = VsCodeExtensionInstaller::new(&cmd, &*ctx.executor);
        let outcomes = ctx
            .reconciler(ResourceKind::VsCodeExtension)
            .reconcile(&list, &installer);
        Ok(list_result(ctx, &outcomes))
    }
}
