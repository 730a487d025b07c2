use anyhow::Result;

use super::{Confirmation, Context, Task, TaskResult, apply_resource};
use crate::config::Settings;
use crate::resources::editor_settings::EditorSettingsResource;

/// Merge the configured editor preferences into VS Code's `settings.json`.
#[derive(Debug)]
pub struct ConfigureEditorSettings;

impl Task for ConfigureEditorSettings {
    fn name(&self) -> &'static str {
        "Configure VS Code settings"
    }

    fn domain(&self) -> &'static str {
        "VS Code settings"
    }

    fn confirmation(&self, settings: &Settings) -> Option<Confirmation> {
        Some(Confirmation {
            question: "Configure VS Code settings?",
            default: settings.prompts.configure_vscode,
        })
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = EditorSettingsResource::new(ctx.vscode_settings(), &ctx.settings.editor);
        apply_resource(ctx, self.domain(), &resource)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::simulate::Mode;
    use crate::tasks::test_helpers::make_context;

    #[test]
    fn writes_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(dir.path());
        assert_eq!(ConfigureEditorSettings.run(&ctx).unwrap(), TaskResult::Ok);
        let written = std::fs::read_to_string(ctx.vscode_settings()).unwrap();
        assert!(written.contains("\"editor.tabSize\": 2"), "{written}");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(dir.path());
        let ctx = ctx.with_mode(Mode::DryRun);
        assert_eq!(ConfigureEditorSettings.run(&ctx).unwrap(), TaskResult::DryRun);
        assert!(!ctx.vscode_settings().exists());
    }
}
