//! Global git configuration entries.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Read a global git config value; `None` when unset or empty.
///
/// # Errors
///
/// Returns an error if `git` cannot be run.
pub fn read_global(key: &str, executor: &dyn Executor) -> Result<Option<String>> {
    let result = executor.run_unchecked("git", &["config", "--global", "--get", key])?;
    let value = result.stdout.trim();
    Ok((result.success && !value.is_empty()).then(|| value.to_string()))
}

/// A `git config --global` entry that can be checked and applied.
#[derive(Debug)]
pub struct GitConfigResource<'a> {
    /// Config key (e.g., "user.email").
    pub key: String,
    /// Desired value.
    pub desired_value: String,
    executor: &'a dyn Executor,
}

impl<'a> GitConfigResource<'a> {
    /// Create a new git config resource.
    #[must_use]
    pub fn new(key: &str, desired_value: &str, executor: &'a dyn Executor) -> Self {
        Self {
            key: key.to_string(),
            desired_value: desired_value.to_string(),
            executor,
        }
    }
}

impl Resource for GitConfigResource<'_> {
    fn description(&self) -> String {
        format!("{} = {}", self.key, self.desired_value)
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(match read_global(&self.key, self.executor)? {
            None => ResourceState::Missing,
            Some(current) if current == self.desired_value => ResourceState::Correct,
            Some(current) => ResourceState::Incorrect { current },
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "git",
            &["config", "--global", &self.key, &self.desired_value],
        )?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn description_format() {
        let executor = MockExecutor::default();
        let resource = GitConfigResource::new("init.defaultBranch", "main", &executor);
        assert_eq!(resource.description(), "init.defaultBranch = main");
    }

    #[test]
    fn current_state_correct_when_value_matches() {
        let executor = MockExecutor::ok("main\n");
        let resource = GitConfigResource::new("init.defaultBranch", "main", &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(
            executor.calls(),
            vec!["git config --global --get init.defaultBranch"]
        );
    }

    #[test]
    fn current_state_incorrect_when_value_differs() {
        let executor = MockExecutor::ok("master\n");
        let resource = GitConfigResource::new("init.defaultBranch", "main", &executor);
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "master".to_string()
            }
        );
    }

    #[test]
    fn current_state_missing_when_unset() {
        let executor = MockExecutor::fail();
        let resource = GitConfigResource::new("user.name", "Ada Lovelace", &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn read_global_ignores_blank_values() {
        let executor = MockExecutor::ok("  \n");
        assert_eq!(read_global("user.email", &executor).unwrap(), None);
    }

    #[test]
    fn apply_sets_value() {
        let executor = MockExecutor::ok("");
        let resource = GitConfigResource::new("user.name", "Ada Lovelace", &executor);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(
            executor.calls(),
            vec!["git config --global user.name Ada Lovelace"]
        );
    }

    #[test]
    fn apply_propagates_failure() {
        let executor = MockExecutor::fail();
        let resource = GitConfigResource::new("user.name", "Ada", &executor);
        assert!(resource.apply().is_err());
    }
}
