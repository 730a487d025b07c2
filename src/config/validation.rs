//! Value validators shared by the settings loader and the `git`/`aws`
//! commands.
//!
//! The `is_*` predicates back the settings schema; the `validate_*`
//! functions check operator input and return a [`ValidationError`] that
//! names the field.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Maximum accepted length of a Git author name, in characters.
pub const GIT_NAME_MAX_CHARS: usize = 100;

/// Output formats accepted by the AWS CLI.
pub const AWS_OUTPUT_FORMATS: &[&str] = &["json", "yaml", "yaml-stream", "text", "table"];

// Patterns are literals; a compile failure would surface as every value
// being rejected, which the tests below rule out.
static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").ok());
static AWS_REGION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-gov)?-[a-z]+-[0-9]+$").ok());
static AWS_PROFILE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());
static NODE_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(latest|v?[0-9]+(\.[0-9]+){0,2})$").ok());
static BRANCH_CHARS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._/-]+$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Whether `value` is a usable Git branch name.
///
/// A conservative subset of `git check-ref-format --branch`: ASCII letters,
/// digits, `.`, `_`, `-` and `/`, with no empty path components, no `..`,
/// and no leading `-` or trailing `.lock`.
#[must_use]
pub fn is_valid_branch(value: &str) -> bool {
    matches(&BRANCH_CHARS, value)
        && !value.starts_with('-')
        && !value.starts_with('/')
        && !value.ends_with('/')
        && !value.ends_with('.')
        && !value.ends_with(".lock")
        && !value.contains("..")
        && !value.contains("//")
        && !value.split('/').any(|part| part.starts_with('.'))
}

/// Whether `value` is `latest` or a version like `20`, `v20.11` or `20.11.1`.
#[must_use]
pub fn is_valid_node_version(value: &str) -> bool {
    matches(&NODE_VERSION, value)
}

/// Validate a Git author name.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] if the name is blank, longer than
/// [`GIT_NAME_MAX_CHARS`], or contains control characters.
pub fn validate_git_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > GIT_NAME_MAX_CHARS
        || trimmed.chars().any(char::is_control)
    {
        return Err(ValidationError::Invalid {
            field: "name",
            value: value.to_string(),
            expected: "a non-empty name of at most 100 printable characters",
        });
    }
    Ok(())
}

/// Validate an email address.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] if the value is not `local@domain.tld`.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if matches(&EMAIL, value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "email",
            value: value.to_string(),
            expected: "an address like user@example.com",
        })
    }
}

/// Validate a branch name supplied on the command line.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] if [`is_valid_branch`] rejects it.
pub fn validate_branch(value: &str) -> Result<(), ValidationError> {
    if is_valid_branch(value) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "branch",
            value: value.to_string(),
            expected: "a valid git branch name such as main",
        })
    }
}

/// Validate an AWS region identifier such as `us-east-1` or `us-gov-west-1`.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] on a malformed region.
pub fn validate_aws_region(value: &str) -> Result<(), ValidationError> {
    if matches(&AWS_REGION, value) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "region",
            value: value.to_string(),
            expected: "a region like us-east-1",
        })
    }
}

/// Validate an AWS CLI output format.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] unless the value is one of
/// [`AWS_OUTPUT_FORMATS`].
pub fn validate_aws_output(value: &str) -> Result<(), ValidationError> {
    if AWS_OUTPUT_FORMATS.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "output",
            value: value.to_string(),
            expected: "one of json, yaml, yaml-stream, text, table",
        })
    }
}

/// Validate an AWS CLI profile name.
///
/// # Errors
///
/// Returns [`ValidationError::Invalid`] if the name has characters outside
/// `[A-Za-z0-9_-]`.
pub fn validate_aws_profile(value: &str) -> Result<(), ValidationError> {
    if matches(&AWS_PROFILE, value) {
        Ok(())
    } else {
        Err(ValidationError::Invalid {
            field: "profile",
            value: value.to_string(),
            expected: "letters, digits, '_' or '-'",
        })
    }
}
