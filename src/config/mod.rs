//! Declarative inputs: the settings document, item lists, and the value
//! validators they share with the `git` and `aws` commands.
pub mod items;
pub mod settings;
pub mod validation;

pub use items::ItemList;
pub use settings::{EditorSettings, NodeVersion, PromptDefaults, Settings};

use std::path::{Path, PathBuf};

/// Settings document name under the repository root.
pub const SETTINGS_FILE: &str = "setup.conf";

/// Well-known locations of the declarative inputs under a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Describe the inputs below `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `setup.conf`.
    #[must_use]
    pub fn settings(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Required application list.
    #[must_use]
    pub fn apps(&self) -> PathBuf {
        self.root.join("lists").join("apps.txt")
    }

    /// Optional global npm package list.
    #[must_use]
    pub fn npm_packages(&self) -> PathBuf {
        self.root.join("lists").join("npm-packages.txt")
    }

    /// Optional VS Code extension list.
    #[must_use]
    pub fn vscode_extensions(&self) -> PathBuf {
        self.root.join("lists").join("vscode-extensions.txt")
    }

    /// Optional terminal theme asset.
    #[must_use]
    pub fn terminal_theme(&self) -> PathBuf {
        self.root.join("themes").join("terminal.terminal")
    }

    /// Optional shell profile snippet.
    #[must_use]
    pub fn shell_profile(&self) -> PathBuf {
        self.root.join("shell").join("profile.sh")
    }
}
