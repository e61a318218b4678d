//! Development-time tracing for debugging declarations.
//!
//! Declaration diagnostics (rejected implementations, conflicts) are printed
//! by the CLI itself. Tracing only adds detail on stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. Call once, from `main`.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `contracts=debug`
/// over the quiet `warn` default.
///
/// # Example
/// ```bash
/// RUST_LOG=contracts=trace contracts check manifest.toml
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { "contracts=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
