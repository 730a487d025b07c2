//! Managed block inside the user's shell rc file.
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::helpers::fs as fs_helpers;
use super::{Resource, ResourceChange, ResourceState};

/// First line of the managed block.
pub const BEGIN_MARKER: &str = "# >>> devstrap >>>";
/// Last line of the managed block.
pub const END_MARKER: &str = "# <<< devstrap <<<";

/// The full block for `snippet`, markers included, ending in a newline.
#[must_use]
pub fn render_block(snippet: &str) -> String {
    format!("{BEGIN_MARKER}\n{}\n{END_MARKER}\n", snippet.trim_end())
}

/// Byte range of the managed block in `content`, including the newline after
/// the end marker when present.
#[must_use]
pub fn find_block(content: &str) -> Option<Range<usize>> {
    let start = content.find(BEGIN_MARKER)?;
    let end_rel = content.get(start..)?.find(END_MARKER)?;
    let mut end = start + end_rel + END_MARKER.len();
    if content.get(end..).is_some_and(|rest| rest.starts_with('\n')) {
        end += 1;
    }
    Some(start..end)
}

/// The snippet from `shell/profile.sh` kept inside a marked block of an rc
/// file; anything outside the markers is left alone.
#[derive(Debug)]
pub struct ShellProfileResource {
    rc_path: PathBuf,
    block: String,
}

impl ShellProfileResource {
    /// Create a resource maintaining `snippet` in `rc_path`.
    #[must_use]
    pub fn new(rc_path: PathBuf, snippet: &str) -> Self {
        Self {
            rc_path,
            block: render_block(snippet),
        }
    }

    /// Path of the rc file.
    #[must_use]
    pub fn rc_path(&self) -> &Path {
        &self.rc_path
    }

    fn read(&self) -> Result<Option<String>> {
        if !self.rc_path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.rc_path)
            .map(Some)
            .with_context(|| format!("reading {}", self.rc_path.display()))
    }
}

impl Resource for ShellProfileResource {
    fn description(&self) -> String {
        format!("devstrap block in {}", self.rc_path.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let Some(content) = self.read()? else {
            return Ok(ResourceState::Missing);
        };
        Ok(match find_block(&content).and_then(|r| content.get(r)) {
            None => ResourceState::Missing,
            Some(existing) if existing.trim_end() == self.block.trim_end() => {
                ResourceState::Correct
            }
            Some(_) => ResourceState::Incorrect {
                current: "block content differs".to_string(),
            },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        let content = self.read()?.unwrap_or_default();
        let updated = match find_block(&content) {
            Some(range) => {
                if content.get(range.clone()).is_some_and(|b| b.trim_end() == self.block.trim_end()) {
                    return Ok(ResourceChange::AlreadyCorrect);
                }
                let mut s = content;
                s.replace_range(range, &self.block);
                s
            }
            None => {
                let mut s = content;
                if !s.is_empty() && !s.ends_with('\n') {
                    s.push('\n');
                }
                if !s.is_empty() {
                    s.push('\n');
                }
                s.push_str(&self.block);
                s
            }
        };
        fs_helpers::write_file(&self.rc_path, updated)?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn rc_in(dir: &Path) -> PathBuf {
        dir.join(".zshrc")
    }

    #[test]
    fn render_block_wraps_snippet() {
        assert_eq!(
            render_block("alias ll='ls -l'\n\n"),
            format!("{BEGIN_MARKER}\nalias ll='ls -l'\n{END_MARKER}\n")
        );
    }

    #[test]
    fn find_block_includes_trailing_newline() {
        let content = format!("a\n{}b\n", render_block("x"));
        let range = find_block(&content).unwrap();
        assert_eq!(&content[range], render_block("x"));
    }

    #[test]
    fn find_block_requires_both_markers() {
        assert_eq!(find_block(&format!("{BEGIN_MARKER}\nx\n")), None);
        assert_eq!(find_block("plain rc\n"), None);
    }

    #[test]
    fn creates_rc_file_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let r = ShellProfileResource::new(rc_in(dir.path()), "export EDITOR=vim");
        assert_eq!(r.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(r.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(
            std::fs::read_to_string(r.rc_path()).unwrap(),
            render_block("export EDITOR=vim")
        );
        assert_eq!(r.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn appends_after_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(rc_in(dir.path()), "export PATH=$HOME/bin:$PATH").unwrap();
        let r = ShellProfileResource::new(rc_in(dir.path()), "export EDITOR=vim");
        r.apply().unwrap();
        let content = std::fs::read_to_string(r.rc_path()).unwrap();
        assert!(content.starts_with("export PATH=$HOME/bin:$PATH\n\n"), "{content}");
        assert!(content.ends_with(&render_block("export EDITOR=vim")));
    }

    #[test]
    fn replaces_changed_block_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let before = format!("top\n{}bottom\n", render_block("old"));
        std::fs::write(rc_in(dir.path()), before).unwrap();
        let r = ShellProfileResource::new(rc_in(dir.path()), "new");
        assert!(matches!(r.current_state().unwrap(), ResourceState::Incorrect { .. }));
        r.apply().unwrap();
        assert_eq!(
            std::fs::read_to_string(r.rc_path()).unwrap(),
            format!("top\n{}bottom\n", render_block("new"))
        );
    }

    #[test]
    fn unchanged_block_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let r = ShellProfileResource::new(rc_in(dir.path()), "same");
        r.apply().unwrap();
        assert_eq!(r.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(
            std::fs::read_to_string(r.rc_path()).unwrap().matches(BEGIN_MARKER).count(),
            1
        );
    }
}
