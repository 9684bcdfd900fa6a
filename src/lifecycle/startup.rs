//! Startup orchestration.
//!
//! Configuration sources are layered, later ones winning:
//! built-in defaults, config file, `PORT`, command-line flags.

use std::path::Path;

use crate::config::{apply_env_overrides, load_config, validate_config, ConfigError, RelayConfig};

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Build the effective configuration.
pub fn resolve_config<F>(
    path: Option<&Path>,
    overrides: &Overrides,
    env: F,
) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;

    if let Some(port) = overrides.port {
        config.listener.port = port;
    }
    if let Some(level) = &overrides.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
