//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize JSON tracing for the process. Filtering is configurable via
/// `RUST_LOG`; `default_directive` applies when it is unset or invalid.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with_default(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Logs go to stderr so command output on stdout stays clean.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
