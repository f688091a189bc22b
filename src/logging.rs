//! Developer diagnostics through `tracing`.
//!
//! Product-level mission history lives in [`crate::memory`]; this module
//! only wires the subscriber used by the binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to `default_filter` when unset.
/// Output goes to stderr in compact format.
///
/// ```bash
/// RUST_LOG=gridbot_runtime=debug gridbot --seed 42
/// ```
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
