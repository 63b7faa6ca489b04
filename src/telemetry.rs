//! Tracing subscriber setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. `RUST_LOG` wins when set.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "msf_flow=debug,info"
    } else {
        "msf_flow=info,warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
