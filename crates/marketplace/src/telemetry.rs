//! Logging and error tracking setup for embedding applications.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::MarketplaceConfig;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "drivex_marketplace=info";

/// Initialize Sentry error tracking and return the guard that must be kept alive.
fn init_sentry(config: &MarketplaceConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber (env filter, fmt output, Sentry layer).
///
/// Sentry is initialized first when a DSN is configured; keep the returned
/// guard alive for the lifetime of the process. Calling this when a global
/// subscriber is already installed leaves that subscriber in place.
#[must_use]
pub fn init(config: &MarketplaceConfig) -> Option<sentry::ClientInitGuard> {
    let guard = init_sentry(config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()
    {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }

    guard
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::config::FirebaseConfig;

    #[test]
    fn test_init_without_dsn_has_no_guard() {
        let config = MarketplaceConfig {
            firebase: FirebaseConfig::with_base_url(
                SecretString::from("AIzaTestKey"),
                "drive-test",
                "http://127.0.0.1:9",
            )
            .unwrap(),
            listings_collection: "vehicles".to_string(),
            detail_cache_ttl: Duration::ZERO,
            sentry_dsn: None,
            sentry_environment: None,
        };
        assert!(init(&config).is_none());
        // A second call keeps the installed subscriber.
        assert!(init(&config).is_none());
    }
}
