//! Tracing setup for the command-line tools.
//!
//! A trimmed-down subscriber: one compact fmt layer, filtered by `RUST_LOG`
//! when set and by `default_level` otherwise.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops. Tests that load
/// documents without going through the CLI simply run unsubscribed.
pub fn init(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
