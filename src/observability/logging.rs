//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick pretty or JSON output from config
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - Logs go to stderr so command output on stdout stays clean

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("poke_portal={}", config.log_level.to_ascii_lowercase())))
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        let config = ObservabilityConfig {
            log_level: "DEBUG".to_string(),
            ..Default::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter(&config).to_string(), "poke_portal=debug");
        }
    }
}
