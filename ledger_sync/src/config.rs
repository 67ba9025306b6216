//! Application configuration (TOML-backed).
//!
//! One file wires the whole run: `[api]` for the remote side, `[sync]`
//! for window/paths/language, `[styles]` for the output directives.
//! Everything is validated here, before any network or ledger I/O, and
//! failures name the offending key.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use order_ingestor::config::ApiConfig;

use crate::error::ConfigError;
use crate::locale::Lang;
use crate::schema::StyleConfig;

fn default_history_days() -> u64 {
    30
}

fn default_excluded_statuses() -> Vec<String> {
    vec!["cancelled".to_string(), "pending".to_string()]
}

/// Local reconciliation settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// How far back the fetch window reaches before snapping to the
    /// Jalali month start.
    #[serde(default = "default_history_days")]
    pub history_days: u64,

    /// The ledger file.
    pub ledger_path: PathBuf,

    /// Output language of labels and headers.
    pub lang: Lang,

    /// Raw upstream statuses dropped before reconciliation.
    #[serde(default = "default_excluded_statuses")]
    pub excluded_statuses: Vec<String>,
}

/// The whole application configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    #[serde(default)]
    pub styles: StyleConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.sync.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "sync.ledger_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Reads, parses and validates the configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&text)?;
    config.validate()?;
    Ok(config)
}
