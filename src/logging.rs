//! Tracing setup.
//!
//! The engine logs through [`tracing`]. Applications that do not install their own
//! subscriber can call [`install_tracing`] once at startup.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the default filter directives.
pub const LOG_ENV: &str = "EDDY_LOG";

const DEFAULT_FILTER: &str = "info";

static TRACING_INSTALLED: Once = Once::new();

/// Installs a `fmt` subscriber filtered by `filter`, or by `EDDY_LOG`, or at `info`.
///
/// Only the first call has an effect. If another global subscriber is already set the
/// call leaves it in place.
pub fn install_tracing(filter: Option<&str>) {
    TRACING_INSTALLED.call_once(|| {
        let filter = filter
            .map(EnvFilter::try_new)
            .and_then(Result::ok)
            .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        let layer = fmt::layer().with_target(true).with_filter(filter);
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("a global tracing subscriber is already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        install_tracing(Some("eddy=debug"));
        install_tracing(None);
        tracing::info!("logging installed twice without panicking");
    }
}
