//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{config::Settings, error::Result};

/// Install a JSON `tracing` subscriber filtered by `service.log_level`
///
/// `RUST_LOG`-style directives are accepted (`info,entity_commons=debug`).
/// An unparsable level falls back to `info`. Calling this again once a
/// global subscriber exists is a no-op.
pub fn init_tracing(settings: &Settings) -> Result<()> {
    let log_level = &settings.service.log_level;

    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialized for service: {}", settings.service.name);
    } else {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    Ok(())
}
