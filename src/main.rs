//! devstrap binary entry point.
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser as _;

use devstrap::cli::{Cli, Command};
use devstrap::commands;
use devstrap::logging::{self, Log, Logger, Verbosity};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match &args.command {
        Command::Version => {
            commands::version::run();
            return ExitCode::SUCCESS;
        }
        Command::Completions(opts) => {
            commands::completions::run(opts);
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let log_path = args
        .global
        .log_file
        .clone()
        .or_else(logging::default_log_path);
    logging::init_subscriber(
        Verbosity::from_flags(args.quiet, args.verbose),
        log_path.as_deref(),
        args.command.name(),
    );
    let logger = Arc::new(Logger::new(log_path));
    let log: Arc<dyn Log> = logger.clone();

    let report = match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Check(opts) => commands::check::run(&args.global, opts, &log),
        Command::Git(opts) => commands::git::run(&args.global, opts, &log),
        Command::Aws(opts) => commands::aws::run(&args.global, opts, &log),
        Command::Version | Command::Completions(_) => return ExitCode::SUCCESS,
    };
    logger.print_summary(&report);
    ExitCode::from(report.exit_code())
}
