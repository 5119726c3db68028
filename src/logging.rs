//! Logging setup using `tracing-subscriber`.
//!
//! Everything is written to stderr so stdout carries only the message ID.
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter directive
/// or a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            anyhow::anyhow!("invalid log level {:?}: {e}", config.level)
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

/// Keep an installed subscriber, or install the default one.
///
/// Used when a failure happens before the configured subscriber is set up.
pub fn ensure_init() -> anyhow::Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    init(&LoggingConfig::default())
}
