//! Tracing setup.
//!
//! A single fmt subscriber with an [`EnvFilter`]: the configured level is the
//! default, `RUST_LOG` overrides it when set.

use tracing_subscriber::EnvFilter;

use crate::error::{PanelError, Result};

/// Install the global tracing subscriber.
///
/// `level` comes from `Settings::application::log_level`. Calling this twice
/// fails with [`PanelError::Logging`]; tests that need output should rely on
/// their own harness instead.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|err| PanelError::Logging(format!("invalid filter '{level}': {err}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| PanelError::Logging(err.to_string()))
}
