//! Command: configure the global git identity and default branch.
use std::sync::Arc;

use crate::cli::{GitOpts, GlobalOpts};
use crate::config::validation::{validate_branch, validate_email, validate_git_name};
use crate::error::ValidationError;
use crate::logging::Log;
use crate::report::{ErrorCollector, ErrorKind, RunReport};
use crate::resources::Resource;
use crate::resources::git_config::{GitConfigResource, read_global};
use crate::tasks::Context;

const DOMAIN: &str = "Git";

/// Run the git command.
#[must_use]
pub fn run(global: &GlobalOpts, opts: &GitOpts, log: &Arc<dyn Log>) -> RunReport {
    let collector = Arc::new(ErrorCollector::new());
    let Some(ctx) = super::CommandSetup::init(global, log.as_ref(), &collector)
        .and_then(|setup| setup.into_context(global, log, Arc::clone(&collector)))
    else {
        return collector.finalize();
    };
    configure(&ctx, opts);
    ctx.collector.finalize()
}

/// Set `user.name`, `user.email` and `init.defaultBranch`.
///
/// Missing git is fatal; rejected input is a failure and nothing is written.
pub fn configure(ctx: &Context, opts: &GitOpts) {
    ctx.log.stage("Configuring git");
    if !ctx.executor.which("git") {
        ctx.log.error("git not found");
        ctx.collector
            .report_fatal(ErrorKind::Prerequisite, DOMAIN, "git not found");
        return;
    }

    let (name, email, branch) = match identity(ctx, opts) {
        Ok(values) => values,
        Err(e) => {
            ctx.log.error(&e.to_string());
            ctx.collector.report_failure(DOMAIN, e.to_string());
            return;
        }
    };

    let executor = &*ctx.executor;
    let mut resources = Vec::new();
    for (key, value) in [
        ("user.name", name.as_deref()),
        ("user.email", email.as_deref()),
        ("init.defaultBranch", Some(branch.as_str())),
    ] {
        match value {
            Some(value) => resources.push(GitConfigResource::new(key, value, executor)),
            None => ctx.collector.record_simulated(DOMAIN),
        }
    }
    let resources: Vec<&dyn Resource> = resources.iter().map(|r| r as &dyn Resource).collect();
    super::apply_each(ctx, DOMAIN, &resources);
}

/// Name and email are `None` when a dry run would have had to prompt.
fn identity(
    ctx: &Context,
    opts: &GitOpts,
) -> Result<(Option<String>, Option<String>, String), ValidationError> {
    let current = |key: &str| read_global(key, &*ctx.executor).ok().flatten();

    let name = super::operator_value(ctx, "name", "Git user name", opts.name.as_deref(), || {
        current("user.name")
    })?;
    if let Some(name) = &name {
        validate_git_name(name)?;
    }

    let email = super::operator_value(ctx, "email", "Git email", opts.email.as_deref(), || {
        current("user.email")
    })?;
    if let Some(email) = &email {
        validate_email(email)?;
    }

    let branch = opts
        .branch
        .clone()
        .unwrap_or_else(|| ctx.settings.git_default_branch.clone());
    validate_branch(&branch)?;

    Ok((name, email, branch))
}
