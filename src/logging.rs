//! Logging configuration for aql-cursor.
//!
//! Logs go to stderr so that query rows written to stdout stay machine-readable.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stderr.
///
/// The filter is taken from `RUST_LOG` when present, e.g. `RUST_LOG=aql_cursor=debug`
/// to trace every request and refill.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the env filter, falling back to the default level.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
