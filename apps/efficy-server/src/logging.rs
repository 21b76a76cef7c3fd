//! Structured logging: `RUST_LOG` wins over the configured level.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Call once, before anything logs.
///
/// # Errors
/// Returns an error for an invalid level directive or when a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(cfg.level.trim())
            .with_context(|| format!("invalid logging.level '{}'", cfg.level))?,
    };
    let registry = tracing_subscriber::registry().with(env_filter);

    match cfg.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    }
    .context("logging already initialized")?;

    tracing::info!(level = %cfg.level, format = cfg.format.as_str(), "Logging initialized");
    Ok(())
}
