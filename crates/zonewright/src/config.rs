//! CLI configuration: thin wrapper around `zonewright_config`.
//!
//! Resolves the settings file from `--config`, builds the runtime
//! `GeneratorConfig` once, and opens the domain store it points at.

use std::path::PathBuf;

use zonewright_config::{Settings, config_path, load_settings};
use zonewright_core::{GeneratorConfig, JsonDomainStore, SystemResolver};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Settings file in effect: `--config` / `ZONEWRIGHT_CONFIG`, else the platform default.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load merged settings honoring `--config`.
pub fn settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    Ok(load_settings(global.config.as_deref())?)
}

/// Everything a generation command needs.
pub struct Runtime {
    pub settings: Settings,
    pub config: GeneratorConfig,
}

impl Runtime {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let settings = settings(global)?;
        let config = settings.into_generator_config(&SystemResolver)?;
        tracing::debug!(
            bind_dir = %config.bind.conf_dir.display(),
            nameservers = config.nameservers.len(),
            "runtime configuration built"
        );
        Ok(Self { settings, config })
    }

    pub fn open_store(&self) -> Result<JsonDomainStore, CliError> {
        Ok(JsonDomainStore::open(self.settings.store_path())?)
    }
}
