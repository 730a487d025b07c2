//! Utility functions for path resolution, ANSI stripping, and time formatting.
use std::path::PathBuf;

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement, erase, etc.
/// are also stripped without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve the default log file location from environment values.
///
/// `$XDG_CACHE_HOME/devstrap/devstrap.log`, else `$HOME/.cache/devstrap/devstrap.log`.
pub(super) fn log_path_from(xdg_cache_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
    let cache_dir = xdg_cache_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".cache")))?;
    Some(cache_dir.join("devstrap").join("devstrap.log"))
}

/// Return the default log file path for this process's environment.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    log_path_from(
        std::env::var("XDG_CACHE_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

/// Format the current local time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }

    #[test]
    fn strip_ansi_handles_csi_sequences() {
        assert_eq!(strip_ansi("\x1b[2;5Htext"), "text");
        assert_eq!(strip_ansi("\x1b[Kworld"), "world");
        assert_eq!(strip_ansi("\x1b[31m\x1b[2JERROR\x1b[0m"), "ERROR");
    }

    #[test]
    fn strip_ansi_empty_string() {
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn log_path_prefers_xdg_cache_home() {
        let path = log_path_from(Some("/xdg".to_string()), Some("/home/dev".to_string()));
        assert_eq!(path, Some(PathBuf::from("/xdg/devstrap/devstrap.log")));
    }

    #[test]
    fn log_path_falls_back_to_home_cache() {
        let path = log_path_from(None, Some("/home/dev".to_string()));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/dev/.cache/devstrap/devstrap.log"))
        );
    }

    #[test]
    fn log_path_ignores_empty_xdg() {
        let path = log_path_from(Some(String::new()), Some("/home/dev".to_string()));
        assert_eq!(
            path,
            Some(PathBuf::from("/home/dev/.cache/devstrap/devstrap.log"))
        );
    }

    #[test]
    fn log_path_none_without_home() {
        assert_eq!(log_path_from(None, None), None);
    }

    #[test]
    fn format_timestamp_has_correct_format() {
        let s = format_timestamp();
        assert_eq!(s.len(), 19, "YYYY-MM-DD HH:MM:SS should be 19 chars");
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
        assert_eq!(&s[13..14], ":");
    }
}
