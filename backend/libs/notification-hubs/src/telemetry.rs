//! Tracing setup for binaries and tests embedding the SDK

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, else `default_filter`
///
/// Returns `false` when a global subscriber is already installed, so this is
/// safe to call from every test.
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let initialized = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .try_init()
        .is_ok();

    if initialized {
        tracing::debug!(default_filter, "Tracing initialized");
    }
    initialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        init_tracing("notification_hubs=debug");
        assert!(!init_tracing("info"));
    }
}
