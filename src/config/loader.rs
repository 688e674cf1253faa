//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::build::{build_router, BuildError};
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::GatewayRouter;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read and deserialize a TOML file without semantic checks.
///
/// Lets a caller install logging from `observability` before validation
/// and building start reporting.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Validate a deserialized configuration and build its root router.
pub fn prepare_gateway(config: &GatewayConfig) -> Result<GatewayRouter, ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;
    Ok(build_router(config)?)
}

/// Load a configuration file and build its root router.
pub fn load_gateway(path: &Path) -> Result<(GatewayConfig, GatewayRouter), ConfigError> {
    let config = read_config(path)?;
    let router = prepare_gateway(&config)?;
    Ok((config, router))
}
