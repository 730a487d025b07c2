//! Developer workstation bootstrapper.
//!
//! Converges a macOS or Linux workstation toward the state declared in a
//! repository: `setup.conf` for settings, `lists/` for applications, npm
//! packages and editor extensions, `themes/` and `shell/` for assets.
//! Every run is idempotent and fail-soft: an item that cannot be installed
//! is recorded and the run moves on, and a summary with an exit code
//! closes every command.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load and validate `setup.conf` and the item lists
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`reconcile`]**: install strategies and per-list reconciliation
//! - **[`tasks`]**: named provisioning steps wired to resources
//! - **[`report`]**: error collection, exit codes and the run summary
//! - **[`commands`]**: top-level subcommands (`install`, `check`, `git`, `aws`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod resources;
pub mod simulate;
pub mod tasks;
