//! Command: configure AWS CLI defaults for a profile.
//!
//! Only `region` and `output` are managed; credentials stay with
//! `aws configure`.
use std::sync::Arc;

use crate::cli::{AwsOpts, GlobalOpts};
use crate::config::validation::{validate_aws_output, validate_aws_profile, validate_aws_region};
use crate::error::ValidationError;
use crate::logging::Log;
use crate::report::{ErrorCollector, ErrorKind, RunReport};
use crate::resources::Resource;
use crate::resources::aws_config::AwsConfigResource;
use crate::tasks::Context;

const DOMAIN: &str = "AWS";

/// Offered when the profile has no region yet.
const DEFAULT_REGION: &str = "us-east-1";

/// Offered when the profile has no output format yet.
const DEFAULT_OUTPUT: &str = "json";

/// Run the aws command.
#[must_use]
pub fn run(global: &GlobalOpts, opts: &AwsOpts, log: &Arc<dyn Log>) -> RunReport {
    let collector = Arc::new(ErrorCollector::new());
    let Some(ctx) = super::CommandSetup::init(global, log.as_ref(), &collector)
        .and_then(|setup| setup.into_context(global, log, Arc::clone(&collector)))
    else {
        return collector.finalize();
    };
    configure(&ctx, opts);
    ctx.collector.finalize()
}

/// Set `region` and `output` for the selected profile.
///
/// Missing `aws` is fatal; rejected input is a failure and nothing is written.
pub fn configure(ctx: &Context, opts: &AwsOpts) {
    ctx.log.stage("Configuring AWS CLI");
    if !ctx.executor.which("aws") {
        ctx.log.error("aws CLI not found");
        ctx.collector
            .report_fatal(ErrorKind::Prerequisite, DOMAIN, "aws CLI not found");
        return;
    }

    let (region, output) = match settings(ctx, opts) {
        Ok(values) => values,
        Err(e) => {
            ctx.log.error(&e.to_string());
            ctx.collector.report_failure(DOMAIN, e.to_string());
            return;
        }
    };

    let executor = &*ctx.executor;
    let mut resources = Vec::new();
    for (key, value) in [("region", region), ("output", output)] {
        match value {
            Some(value) => resources.push(AwsConfigResource::new(key, &value, &opts.profile, executor)),
            None => ctx.collector.record_simulated(DOMAIN),
        }
    }
    let resources: Vec<&dyn Resource> = resources.iter().map(|r| r as &dyn Resource).collect();
    super::apply_each(ctx, DOMAIN, &resources);
}

/// Either value is `None` when a dry run would have had to prompt.
fn settings(
    ctx: &Context,
    opts: &AwsOpts,
) -> Result<(Option<String>, Option<String>), ValidationError> {
    validate_aws_profile(&opts.profile)?;
    let current = |key: &str, fallback: &str| {
        ctx.executor
            .run_unchecked("aws", &["configure", "get", key, "--profile", &opts.profile])
            .ok()
            .filter(|r| r.success)
            .map(|r| r.stdout.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| Some(fallback.to_string()))
    };

    let region = super::operator_value(ctx, "region", "AWS region", opts.region.as_deref(), || {
        current("region", DEFAULT_REGION)
    })?;
    if let Some(region) = &region {
        validate_aws_region(region)?;
    }

    let output = super::operator_value(
        ctx,
        "output",
        "AWS output format",
        opts.output.as_deref(),
        || current("output", DEFAULT_OUTPUT),
    )?;
    if let Some(output) = &output {
        validate_aws_output(output)?;
    }

    Ok((region, output))
}
