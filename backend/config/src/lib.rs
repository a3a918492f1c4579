//! `shaman-config`: relay and client configuration.
//!
//! Provides:
//! - Typed config schema (relay, client, logging)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and environment overrides
//! - Validation with warnings for risky-but-allowed settings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::{ClientConfig, LoggingConfig, RelayConfig, ShamanConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// A config that passed validation, with the warnings validation raised.
///
/// Warnings are returned rather than logged so callers can emit them once
/// their tracing subscriber is installed.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: ShamanConfig,
    pub warnings: Vec<ConfigValidationError>,
}

impl PreparedConfig {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
        }
    }
}

/// Load a config file, substitute `${VAR}` references, apply environment
/// overrides, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<PreparedConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let raw_config = load_config(path).await?;
    prepare(raw_config, &env)
}

/// The synchronous half of [`load_and_prepare`], with an explicit environment.
pub fn prepare(raw_config: ShamanConfig, env: &HashMap<String, String>) -> Result<PreparedConfig> {
    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: ShamanConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config, env);

    let report = validate(&config);
    if let Some(error) = report.errors.into_iter().next() {
        return Err(error.into());
    }

    Ok(PreparedConfig { config, warnings: report.warnings })
}
