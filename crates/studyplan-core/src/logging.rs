//! Tracing initialization for hosts and tests.

use tracing_subscriber::EnvFilter;

/// Initialize a global `tracing` subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Safe to call more
/// than once: subsequent calls are no-ops instead of panicking, so tests
/// and embedding hosts can both call it unconditionally.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
