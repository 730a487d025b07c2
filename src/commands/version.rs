//! Command: print version information.

/// Version string: the release or `git describe` version baked in at build
/// time, else the crate version.
#[must_use]
pub fn version_string() -> String {
    let version = option_env!("DEVSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    format!("devstrap {version}")
}

/// Print the devstrap version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("{}", version_string());
}
