//! tracing setup for the application binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber.
///
/// The level can be overridden with the `OMEN_LOG` environment variable
/// (e.g. `OMEN_LOG=omen=debug`); otherwise `default_level` is used.
pub fn init(default_level: &str) {
    let env_filter = EnvFilter::try_from_env("OMEN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized");
    }
}
