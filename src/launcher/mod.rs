//! Flow launcher
//!
//! Reproduces the original wrapper contract: resolve the installation
//! home, extend the executable search path with the flow's bin
//! directory, print one timestamped line, and replace the current
//! process with the flow binary, forwarding every argument verbatim.
//! There is no validation or retry; an exec failure surfaces as the OS
//! error.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

/// Environment variable naming the installation home.
pub const HOME_VAR: &str = "MSF_FLOW_HOME";

/// Search-path variable extended before handing off.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Name of the flow binary the launcher hands off to.
pub const FLOW_BIN: &str = "msf-flow";

/// Resolve the installation home: `MSF_FLOW_HOME` when set, otherwise
/// the directory containing the current executable's parent (so a
/// binary installed at `<home>/bin/msf-harvest` finds `<home>`).
pub fn resolve_home() -> PathBuf {
    if let Some(home) = env::var_os(HOME_VAR) {
        return PathBuf::from(home);
    }

    env::current_exe()
        .ok()
        .and_then(|exe| {
            let bin_dir = exe.parent()?;
            Some(bin_dir.parent().unwrap_or(bin_dir).to_path_buf())
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Prepend `<home>/bin` to an existing search path value.
pub fn extended_search_path(home: &Path, current: Option<OsString>) -> OsString {
    let bin_dir = home.join("bin");
    let mut parts = vec![bin_dir];
    if let Some(current) = current {
        parts.extend(env::split_paths(&current));
    }
    // Joining only fails on paths containing the separator; fall back
    // to the bin directory alone in that case.
    env::join_paths(parts.iter()).unwrap_or_else(|_| home.join("bin").into_os_string())
}

/// The single timestamped line printed before transferring control.
pub fn startup_line(now: DateTime<Utc>, home: &Path) -> String {
    format!(
        "{} msf-harvest: launching {} from {}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        FLOW_BIN,
        home.display()
    )
}

/// Build the hand-off command: the flow binary from `<home>/bin`, all
/// arguments forwarded unchanged, search path extended.
pub fn build_command<I, S>(home: &Path, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut cmd = Command::new(home.join("bin").join(FLOW_BIN));
    cmd.args(args.into_iter().map(Into::into));
    cmd.env(
        SEARCH_PATH_VAR,
        extended_search_path(home, env::var_os(SEARCH_PATH_VAR)),
    );
    cmd
}

/// Replace the current process with `cmd`. Returns only on failure.
#[cfg(unix)]
pub fn exec(mut cmd: Command) -> std::io::Error {
    use std::os::unix::process::CommandExt;
    cmd.exec()
}

/// Without process replacement, run to completion and exit with the
/// child's status.
#[cfg(not(unix))]
pub fn exec(mut cmd: Command) -> std::io::Error {
    match cmd.status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(e) => e,
    }
}
