//! Flow launcher binary
//!
//! Sets up the environment and replaces itself with the `msf-flow`
//! binary, forwarding all arguments unchanged.

use std::env;
use std::ffi::OsString;
use std::process;

use chrono::Utc;
use msf_flow::launcher::{build_command, exec, resolve_home, startup_line, FLOW_BIN};

fn main() {
    let args: Vec<OsString> = env::args_os().skip(1).collect();
    let home = resolve_home();

    println!("{}", startup_line(Utc::now(), &home));

    let cmd = build_command(&home, args);
    let err = exec(cmd);

    // Only reached when exec failed.
    eprintln!("msf-harvest: failed to exec {}: {}", FLOW_BIN, err);
    process::exit(127);
}
