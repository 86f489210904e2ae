//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use modproxy_core::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` overrides the configured
/// level.
///
/// Returns `false` if a subscriber was already installed, which is the
/// normal case when the host or a test harness set one up first.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        _ => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    installed.is_ok()
}

