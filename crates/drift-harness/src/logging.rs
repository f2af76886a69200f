//! Tracing setup for harness runs
//!
//! Kept out of the correlation core; binaries and tests opt in explicitly.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, reading `RUST_LOG` and defaulting to
/// `info`. Idempotent: repeated calls (e.g. from parallel tests) are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
