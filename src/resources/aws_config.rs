//! AWS CLI profile settings.
use anyhow::Result;

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// One `aws configure` key of a named profile (e.g. `region` of `default`).
#[derive(Debug)]
pub struct AwsConfigResource<'a> {
    /// Setting name (`region`, `output`).
    pub key: String,
    /// Desired value.
    pub value: String,
    /// Profile name.
    pub profile: String,
    executor: &'a dyn Executor,
}

impl<'a> AwsConfigResource<'a> {
    /// Create a new AWS setting resource.
    #[must_use]
    pub fn new(key: &str, value: &str, profile: &str, executor: &'a dyn Executor) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            profile: profile.to_string(),
            executor,
        }
    }
}

impl Resource for AwsConfigResource<'_> {
    fn description(&self) -> String {
        format!("{} = {} (profile {})", self.key, self.value, self.profile)
    }

    fn current_state(&self) -> Result<ResourceState> {
        // `aws configure get` exits 1 when the key is unset.
        let result = self.executor.run_unchecked(
            "aws",
            &["configure", "get", &self.key, "--profile", &self.profile],
        )?;
        let current = result.stdout.trim();
        Ok(if !result.success || current.is_empty() {
            ResourceState::Missing
        } else if current == self.value {
            ResourceState::Correct
        } else {
            ResourceState::Incorrect {
                current: current.to_string(),
            }
        })
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "aws",
            &[
                "configure",
                "set",
                &self.key,
                &self.value,
                "--profile",
                &self.profile,
            ],
        )?;
        Ok(ResourceChange::Applied)
    }
}
