//! Logging system initialization
//!
//! Sets up the tracing subscriber once during application startup,
//! after the configuration has been loaded.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with the configured verbosity.
///
/// `level` accepts anything `EnvFilter` understands ("info",
/// "debug", "iplocation=debug,info", ...); unparseable values fall
/// back to "info".
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .init();
}
