//! VS Code `settings.json` managed keys.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

use super::helpers::fs as fs_helpers;
use super::{Resource, ResourceChange, ResourceState};
use crate::config::EditorSettings;

/// The `settings.json` values derived from [`EditorSettings`], in file order.
#[must_use]
pub fn desired_values(editor: &EditorSettings) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("editor.fontSize".into(), editor.font_size.into());
    map.insert("editor.tabSize".into(), editor.tab_size.into());
    map.insert("workbench.colorTheme".into(), editor.color_theme.clone().into());
    map.insert("workbench.iconTheme".into(), editor.icon_theme.clone().into());
    map.insert("editor.formatOnSave".into(), editor.format_on_save.into());
    map.insert("files.autoSave".into(), editor.auto_save.clone().into());
    map.insert(
        "editor.defaultFormatter".into(),
        editor.default_formatter.clone().into(),
    );
    map.insert("editor.wordWrap".into(), editor.word_wrap.clone().into());
    map
}

/// A `settings.json` whose managed keys must hold the desired values.
///
/// Keys the file already contains and that are not managed are preserved.
/// Before an existing file is modified it is copied to `settings.json.bak`.
#[derive(Debug)]
pub struct EditorSettingsResource {
    path: PathBuf,
    desired: Map<String, Value>,
}

enum Current {
    Missing,
    Unreadable(String),
    Object(Map<String, Value>),
}

impl EditorSettingsResource {
    /// Create a resource for the file at `path`.
    #[must_use]
    pub fn new(path: PathBuf, editor: &EditorSettings) -> Self {
        Self {
            path,
            desired: desired_values(editor),
        }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Current> {
        if !self.path.exists() {
            return Ok(Current::Missing);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Current::Object(Map::new()));
        }
        Ok(match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Current::Object(map),
            Ok(_) => Current::Unreadable("top level is not an object".to_string()),
            Err(e) => Current::Unreadable(format!("not plain JSON ({e})")),
        })
    }

    /// Managed keys whose current value differs from the desired one.
    fn drifted<'a>(&'a self, current: &Map<String, Value>) -> Vec<&'a str> {
        self.desired
            .iter()
            .filter(|(k, v)| current.get(k.as_str()) != Some(*v))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    fn write(&self, map: &Map<String, Value>) -> Result<()> {
        let mut text = serde_json::to_string_pretty(map).context("serializing settings")?;
        text.push('\n');
        fs_helpers::write_file(&self.path, text)
    }
}

impl Resource for EditorSettingsResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(match self.read()? {
            Current::Missing => ResourceState::Missing,
            Current::Unreadable(reason) => ResourceState::Invalid { reason },
            Current::Object(map) => {
                let drifted = self.drifted(&map);
                if drifted.is_empty() {
                    ResourceState::Correct
                } else {
                    ResourceState::Incorrect {
                        current: format!("differs in {}", drifted.join(", ")),
                    }
                }
            }
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.read()? {
            Current::Missing => {
                self.write(&self.desired)?;
                Ok(ResourceChange::Applied)
            }
            Current::Unreadable(reason) => Ok(ResourceChange::Skipped { reason }),
            Current::Object(mut map) => {
                if self.drifted(&map).is_empty() {
                    return Ok(ResourceChange::AlreadyCorrect);
                }
                fs_helpers::backup(&self.path)?;
                for (k, v) in &self.desired {
                    map.insert(k.clone(), v.clone());
                }
                self.write(&map)?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}
