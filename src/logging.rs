//! Diagnostic logging
//!
//! All diagnostics go to stderr through `tracing`, so stdout carries query
//! results only. `RUST_LOG` overrides the per-command default level.

use tracing_subscriber::EnvFilter;

/// Default filter for `run`: per-node failures and quorum outcomes only
pub const RUN_DEFAULT_FILTER: &str = "warn";

/// Default filter for `serve`: one line per request
pub const SERVE_DEFAULT_FILTER: &str = "info";

/// Install the global subscriber
///
/// A second call is a no-op.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
