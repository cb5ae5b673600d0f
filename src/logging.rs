//! Logging setup for the CLI.
//!
//! Library code only emits `tracing` events; the binary decides where they go.

use tracing::Level;

/// Resolve the effective level from CLI flags and the configured name.
///
/// `--verbose` wins over `--quiet`, and both win over settings. An
/// unrecognized name falls back to `INFO`.
pub fn resolve_level(verbose: bool, quiet: bool, configured: &str) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        configured.parse().unwrap_or(Level::INFO)
    }
}

/// Install a stderr `fmt` subscriber at `level`.
///
/// Does nothing if a global subscriber is already set.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
