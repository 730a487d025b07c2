//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::exec::DEFAULT_TIMEOUT;

/// Top-level CLI entry point for the workstation bootstrapper.
#[derive(Parser, Debug)]
#[command(
    name = "devstrap",
    about = "Idempotent developer workstation bootstrapper",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the repository root (setup.conf, lists/, themes/, shell/)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Override the settings document (default: <root>/setup.conf)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Answer every prompt with its configured default
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Reconcile the items of each list concurrently
    #[arg(long, global = true)]
    pub parallel: bool,

    /// Seconds before an external command is killed
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Append the run log here instead of ~/.cache/devstrap/devstrap.log
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision the workstation from setup.conf and lists/
    Install(InstallOpts),
    /// Verify the workstation without changing it
    Check(CheckOpts),
    /// Configure the global git identity and default branch
    Git(GitOpts),
    /// Configure AWS CLI region and output format
    Aws(AwsOpts),
    /// Print a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, written to the log file header.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Check(_) => "check",
            Self::Git(_) => "git",
            Self::Aws(_) => "aws",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific tasks (matched against task names and domains)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks (matched against task names and domains)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `check` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckOpts {
    /// Also verify SSH authentication with GitHub
    #[arg(long)]
    pub test_ssh: bool,

    /// Also verify AWS credentials with `aws sts get-caller-identity`
    #[arg(long)]
    pub test_aws: bool,
}

/// Options for the `git` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct GitOpts {
    /// Value for user.name (prompted when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Value for user.email (prompted when omitted)
    #[arg(long)]
    pub email: Option<String>,

    /// Value for init.defaultBranch (default: GIT_DEFAULT_BRANCH)
    #[arg(long)]
    pub branch: Option<String>,
}

/// Options for the `aws` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AwsOpts {
    /// Default region (prompted when omitted)
    #[arg(long)]
    pub region: Option<String>,

    /// Default output format (prompted when omitted)
    #[arg(long)]
    pub output: Option<String>,

    /// Profile to configure
    #[arg(long, default_value = "default")]
    pub profile: String,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_dry_run() {
        let cli = Cli::parse_from(["devstrap", "--dry-run", "install"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.command, Command::Install(_)));
    }

    #[test]
    fn parse_install_dry_run_short_after_subcommand() {
        let cli = Cli::parse_from(["devstrap", "install", "-d"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["devstrap", "install", "--skip", "node,npm"]);
        assert!(
            matches!(&cli.command, Command::Install(_)),
            "Expected Install command"
        );
        if let Command::Install(opts) = cli.command {
            assert_eq!(opts.skip, vec!["node", "npm"]);
        }
    }

    #[test]
    fn parse_install_only_tasks() {
        let cli = Cli::parse_from(["devstrap", "install", "--only", "vs code"]);
        assert!(
            matches!(&cli.command, Command::Install(_)),
            "Expected Install command"
        );
        if let Command::Install(opts) = cli.command {
            assert_eq!(opts.only, vec!["vs code"]);
        }
    }

    #[test]
    fn parse_check_flags() {
        let cli = Cli::parse_from(["devstrap", "check", "--test-ssh", "--test-aws"]);
        assert!(
            matches!(&cli.command, Command::Check(_)),
            "Expected Check command"
        );
        if let Command::Check(opts) = cli.command {
            assert!(opts.test_ssh);
            assert!(opts.test_aws);
        }
    }

    #[test]
    fn parse_git_identity() {
        let cli = Cli::parse_from([
            "devstrap",
            "git",
            "--name",
            "Ada Lovelace",
            "--email",
            "ada@example.com",
        ]);
        assert!(
            matches!(&cli.command, Command::Git(_)),
            "Expected Git command"
        );
        if let Command::Git(opts) = cli.command {
            assert_eq!(opts.name.as_deref(), Some("Ada Lovelace"));
            assert_eq!(opts.email.as_deref(), Some("ada@example.com"));
            assert_eq!(opts.branch, None);
        }
    }

    #[test]
    fn aws_profile_defaults_to_default() {
        let cli = Cli::parse_from(["devstrap", "aws", "--region", "eu-west-1"]);
        assert!(
            matches!(&cli.command, Command::Aws(_)),
            "Expected Aws command"
        );
        if let Command::Aws(opts) = cli.command {
            assert_eq!(opts.profile, "default");
            assert_eq!(opts.region.as_deref(), Some("eu-west-1"));
        }
    }

    #[test]
    fn parse_completions_shell() {
        let cli = Cli::parse_from(["devstrap", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts { shell: Shell::Zsh })
        ));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["devstrap", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.name(), "version");
    }

    #[test]
    fn parse_verbose_and_quiet() {
        assert!(Cli::parse_from(["devstrap", "-v", "install"]).verbose);
        assert!(Cli::parse_from(["devstrap", "--quiet", "install"]).quiet);
        assert!(Cli::try_parse_from(["devstrap", "-v", "-q", "install"]).is_err());
    }

    #[test]
    fn parse_root_and_config_override() {
        let cli = Cli::parse_from([
            "devstrap",
            "--root",
            "/tmp/setup",
            "--config",
            "/tmp/other.conf",
            "install",
        ]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/setup")));
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/other.conf")));
    }

    #[test]
    fn parallel_is_disabled_by_default() {
        let cli = Cli::parse_from(["devstrap", "install"]);
        assert!(!cli.global.parallel, "parallel should be opt-in");
        assert!(Cli::parse_from(["devstrap", "--parallel", "install"]).global.parallel);
    }

    #[test]
    fn timeout_defaults_and_rejects_zero() {
        let cli = Cli::parse_from(["devstrap", "install"]);
        assert_eq!(cli.global.timeout, 600);
        assert_eq!(
            Cli::parse_from(["devstrap", "--timeout", "30", "check"]).global.timeout,
            30
        );
        assert!(Cli::try_parse_from(["devstrap", "--timeout", "0", "check"]).is_err());
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["devstrap"]).is_err());
    }
}
