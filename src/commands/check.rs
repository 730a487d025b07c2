//! Command: verify the workstation without changing it.
//!
//! Every check reports through the collector: a missing prerequisite or
//! identity is a failure, drift in optional domains is a warning.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{CheckOpts, GlobalOpts};
use crate::config::ItemList;
use crate::error::ItemListError;
use crate::logging::Log;
use crate::reconcile::ResourceKind;
use crate::report::{ErrorCollector, RunReport};
use crate::resources::brew;
use crate::resources::editor_settings::EditorSettingsResource;
use crate::resources::git_config::read_global;
use crate::resources::node::NodeInstaller;
use crate::resources::npm::{NpmInstaller, package_name};
use crate::resources::shell_profile::ShellProfileResource;
use crate::resources::vscode_extension::{find_code_command, installed_extensions};
use crate::resources::{Installer, Resource, ResourceState};
use crate::simulate::Mode;
use crate::tasks::applications::app_installer;
use crate::tasks::{Context, Task, TaskResult, load_optional_list};

/// Host used for the SSH authentication check.
const SSH_HOST: &str = "git@github.com";

/// Run the check command.
#[must_use]
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Arc<dyn Log>) -> RunReport {
    let collector = Arc::new(ErrorCollector::new());
    let Some(ctx) = super::CommandSetup::init(global, log.as_ref(), &collector)
        .and_then(|setup| setup.into_context(global, log, Arc::clone(&collector)))
    else {
        return collector.finalize();
    };
    // Checks only read state, so they run the same with or without --dry-run.
    let ctx = ctx.with_mode(Mode::Real);
    super::run_tasks_to_completion(&all_check_tasks(opts), &ctx)
}

/// Every health check, in execution order.
#[must_use]
pub fn all_check_tasks(opts: &CheckOpts) -> Vec<Box<dyn Task>> {
    let mut tasks: Vec<Box<dyn Task>> = vec![
        Box::new(CheckHomebrew),
        Box::new(CheckApplications),
        Box::new(CheckNode),
        Box::new(CheckNpmPackages),
        Box::new(CheckEditorSettings),
        Box::new(CheckEditorExtensions),
        Box::new(CheckGit),
        Box::new(CheckShellProfile),
    ];
    if opts.test_ssh {
        tasks.push(Box::new(CheckSsh));
    }
    if opts.test_aws {
        tasks.push(Box::new(CheckAws));
    }
    tasks
}

fn pass(ctx: &Context, domain: &str, msg: &str) {
    ctx.log.info(&format!("ok: {msg}"));
    ctx.collector.record_pass(domain);
}

fn warn(ctx: &Context, domain: &str, msg: String) {
    ctx.log.warn(&msg);
    ctx.collector.report_warning(domain, msg);
}

fn fail(ctx: &Context, domain: &str, msg: String) {
    ctx.log.error(&msg);
    ctx.collector.report_failure(domain, msg);
}

// ---------------------------------------------------------------------------
// Provisioning domains
// ---------------------------------------------------------------------------

/// Homebrew must be installed.
#[derive(Debug)]
struct CheckHomebrew;

impl Task for CheckHomebrew {
    fn name(&self) -> &'static str {
        "Check Homebrew"
    }

    fn domain(&self) -> &'static str {
        "Homebrew"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        match brew::locate(&*ctx.executor) {
            Some(path) => pass(ctx, self.domain(), &format!("brew found ({path})")),
            None => fail(ctx, self.domain(), "brew not found".to_string()),
        }
        Ok(TaskResult::Ok)
    }
}

/// Every listed application should be installed as a cask or formula.
#[derive(Debug)]
struct CheckApplications;

impl Task for CheckApplications {
    fn name(&self) -> &'static str {
        "Check applications"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::Application.domain()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let list = match ItemList::load(&ctx.layout.apps()) {
            Ok(list) => list,
            Err(e @ ItemListError::Missing { .. }) => {
                fail(ctx, self.domain(), e.to_string());
                return Ok(TaskResult::Skipped("no application list".to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let Some(brew) = brew::locate(&*ctx.executor) else {
            return Ok(TaskResult::Skipped("brew not found".to_string()));
        };

        let chain = app_installer(ctx, &brew);
        for app in &list {
            match chain.probe(app) {
                Ok(true) => pass(ctx, self.domain(), app),
                Ok(false) => warn(ctx, self.domain(), format!("{app} is not installed")),
                Err(e) => warn(ctx, self.domain(), format!("{app}: {e:#}")),
            }
        }
        Ok(TaskResult::Ok)
    }
}

/// nvm and the configured Node.js version should be installed.
#[derive(Debug)]
struct CheckNode;

impl Task for CheckNode {
    fn name(&self) -> &'static str {
        "Check Node.js"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::Runtime.domain()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let shell = ctx.nvm();
        if !shell.is_installed() {
            warn(ctx, self.domain(), "nvm is not installed".to_string());
            return Ok(TaskResult::Ok);
        }
        pass(ctx, self.domain(), "nvm installed");

        let version = &ctx.settings.node_version;
        match NodeInstaller::new(shell).probe(version.nvm_spec()) {
            Ok(true) => pass(ctx, self.domain(), &format!("Node.js {version}")),
            Ok(false) => warn(
                ctx,
                self.domain(),
                format!("Node.js {version} is not installed"),
            ),
            Err(e) => warn(ctx, self.domain(), format!("Node.js {version}: {e:#}")),
        }
        Ok(TaskResult::Ok)
    }
}

/// Every listed npm package should be installed globally.
#[derive(Debug)]
struct CheckNpmPackages;

impl Task for CheckNpmPackages {
    fn name(&self) -> &'static str {
        "Check npm packages"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::NpmPackage.domain()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(list) = load_optional_list(ctx, self.domain(), &ctx.layout.npm_packages())? else {
            return Ok(TaskResult::Skipped("no npm package list".to_string()));
        };
        let nvm = Some(ctx.nvm()).filter(|s| s.is_installed());
        if !ctx.executor.which("npm") && nvm.is_none() {
            warn(ctx, self.domain(), "npm not found".to_string());
            return Ok(TaskResult::Skipped("npm not found".to_string()));
        }

        let installed = match NpmInstaller::new(&*ctx.executor, nvm).installed_packages() {
            Ok(set) => set,
            Err(e) => {
                warn(ctx, self.domain(), format!("cannot list npm packages: {e:#}"));
                return Ok(TaskResult::Ok);
            }
        };
        for pkg in &list {
            if installed.contains(package_name(pkg)) {
                pass(ctx, self.domain(), pkg);
            } else {
                warn(ctx, self.domain(), format!("{pkg} is not installed"));
            }
        }
        Ok(TaskResult::Ok)
    }
}

/// VS Code `settings.json` should hold the configured values.
#[derive(Debug)]
struct CheckEditorSettings;

impl Task for CheckEditorSettings {
    fn name(&self) -> &'static str {
        "Check VS Code settings"
    }

    fn domain(&self) -> &'static str {
        "VS Code settings"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = EditorSettingsResource::new(ctx.vscode_settings(), &ctx.settings.editor);
        let path = resource.path().display().to_string();
        match resource.current_state()? {
            ResourceState::Correct => pass(ctx, self.domain(), &path),
            ResourceState::Missing => warn(ctx, self.domain(), format!("{path} not found")),
            ResourceState::Incorrect { current } => {
                warn(ctx, self.domain(), format!("{path}: {current}"));
            }
            ResourceState::Invalid { reason } => {
                warn(ctx, self.domain(), format!("{path}: {reason}"));
            }
        }
        Ok(TaskResult::Ok)
    }
}

/// The VS Code CLI and every listed extension should be installed.
#[derive(Debug)]
struct CheckEditorExtensions;

impl Task for CheckEditorExtensions {
    fn name(&self) -> &'static str {
        "Check VS Code extensions"
    }

    fn domain(&self) -> &'static str {
        ResourceKind::VsCodeExtension.domain()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(cmd) = find_code_command(&*ctx.executor) else {
            warn(ctx, self.domain(), "VS Code CLI not found".to_string());
            return Ok(TaskResult::Skipped("VS Code CLI not found".to_string()));
        };
        pass(ctx, self.domain(), &format!("VS Code CLI ({cmd})"));

        let Some(list) =
            load_optional_list(ctx, self.domain(), &ctx.layout.vscode_extensions())?
        else {
            return Ok(TaskResult::Skipped("no extension list".to_string()));
        };
        let installed = match installed_extensions(&cmd, &*ctx.executor) {
            Ok(set) => set,
            Err(e) => {
                warn(ctx, self.domain(), format!("cannot list extensions: {e:#}"));
                return Ok(TaskResult::Ok);
            }
        };
        for ext in &list {
            if installed.contains(&ext.to_lowercase()) {
                pass(ctx, self.domain(), ext);
            } else {
                warn(ctx, self.domain(), format!("{ext} is not installed"));
            }
        }
        Ok(TaskResult::Ok)
    }
}

/// git must be installed with an identity; the default branch should match
/// the settings.
#[derive(Debug)]
struct CheckGit;

impl Task for CheckGit {
    fn name(&self) -> &'static str {
        "Check git"
    }

    fn domain(&self) -> &'static str {
        "Git"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which("git") {
            fail(ctx, self.domain(), "git not found".to_string());
            return Ok(TaskResult::Ok);
        }
        pass(ctx, self.domain(), "git installed");

        for key in ["user.name", "user.email"] {
            match read_global(key, &*ctx.executor)? {
                Some(value) => pass(ctx, self.domain(), &format!("{key} = {value}")),
                None => fail(
                    ctx,
                    self.domain(),
                    format!("{key} is not set (run devstrap git)"),
                ),
            }
        }

        let expected = &ctx.settings.git_default_branch;
        match read_global("init.defaultBranch", &*ctx.executor)? {
            Some(branch) if branch == *expected => {
                pass(ctx, self.domain(), &format!("init.defaultBranch = {branch}"));
            }
            Some(branch) => warn(
                ctx,
                self.domain(),
                format!("init.defaultBranch is {branch}, expected {expected}"),
            ),
            None => warn(
                ctx,
                self.domain(),
                format!("init.defaultBranch is not set, expected {expected}"),
            ),
        }
        Ok(TaskResult::Ok)
    }
}

/// `~/.zshrc` should carry the current managed block.
#[derive(Debug)]
struct CheckShellProfile;

impl Task for CheckShellProfile {
    fn name(&self) -> &'static str {
        "Check shell profile"
    }

    fn domain(&self) -> &'static str {
        "Shell profile"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let source = ctx.layout.shell_profile();
        if !source.is_file() {
            ctx.collector.report_missing(
                self.domain(),
                format!("profile snippet not found: {}", source.display()),
            );
            return Ok(TaskResult::Skipped("no shell profile snippet".to_string()));
        }
        let snippet = std::fs::read_to_string(&source)
            .with_context(|| format!("reading {}", source.display()))?;
        let resource = ShellProfileResource::new(ctx.zshrc(), &snippet);
        let desc = resource.description();
        match resource.current_state()? {
            ResourceState::Correct => pass(ctx, self.domain(), &desc),
            ResourceState::Missing => warn(ctx, self.domain(), format!("{desc} is missing")),
            ResourceState::Incorrect { current } | ResourceState::Invalid { reason: current } => {
                warn(ctx, self.domain(), format!("{desc}: {current}"));
            }
        }
        Ok(TaskResult::Ok)
    }
}

// ---------------------------------------------------------------------------
// Opt-in connectivity checks
// ---------------------------------------------------------------------------

/// SSH authentication with GitHub must succeed.
#[derive(Debug)]
struct CheckSsh;

impl Task for CheckSsh {
    fn name(&self) -> &'static str {
        "Check SSH authentication"
    }

    fn domain(&self) -> &'static str {
        "SSH"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which("ssh") {
            fail(ctx, self.domain(), "ssh not found".to_string());
            return Ok(TaskResult::Ok);
        }
        // GitHub closes the session with exit 1 even when authentication works.
        let result = ctx.executor.run_unchecked(
            "ssh",
            &[
                "-T",
                "-o",
                "BatchMode=yes",
                "-o",
                "StrictHostKeyChecking=accept-new",
                SSH_HOST,
            ],
        )?;
        let output = format!("{}{}", result.stdout, result.stderr);
        if output.contains("successfully authenticated") {
            pass(ctx, self.domain(), &format!("authenticated with {SSH_HOST}"));
        } else {
            fail(
                ctx,
                self.domain(),
                format!("SSH authentication with {SSH_HOST} failed: {}", output.trim()),
            );
        }
        Ok(TaskResult::Ok)
    }
}

/// AWS credentials must resolve to a caller identity.
#[derive(Debug)]
struct CheckAws;

impl Task for CheckAws {
    fn name(&self) -> &'static str {
        "Check AWS credentials"
    }

    fn domain(&self) -> &'static str {
        "AWS"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which("aws") {
            fail(ctx, self.domain(), "aws CLI not found".to_string());
            return Ok(TaskResult::Ok);
        }
        let result = ctx
            .executor
            .run_unchecked("aws", &["sts", "get-caller-identity"])?;
        if result.success {
            pass(ctx, self.domain(), "caller identity resolved");
        } else {
            fail(
                ctx,
                self.domain(),
                format!("aws sts get-caller-identity failed: {}", result.stderr.trim()),
            );
        }
        Ok(TaskResult::Ok)
    }
}
