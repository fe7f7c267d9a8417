//! Tracing setup with a runtime-switchable verbosity.
//!
//! Logs go to stderr; stdout belongs to the bridge protocol.

use cheese_core::VerbosityHook;
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt, reload};

use crate::error::RunnerError;

/// Filter directive for the given debug flag.
const fn level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Whether `RUST_LOG` picked the startup filter.
pub fn filter_from_env() -> bool {
    std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

/// Install the global subscriber and return the hook that retunes it.
///
/// Starts from `RUST_LOG`, or `info` when it is unset. Toggling debug
/// replaces the filter with a plain `debug` or `info` level.
pub fn init() -> Result<VerbosityHook, RunnerError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(false)));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()?;

    Ok(Box::new(move |debug| {
        if let Err(e) = handle.reload(EnvFilter::new(level(debug))) {
            warn!(error = %e, "unable to change log verbosity");
        }
    }))
}
