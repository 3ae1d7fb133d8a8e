//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::IcedbConfig;
use std::path::Path;

/// Loads and validates `icedb.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<IcedbConfig, ConfigError> {
    let config_path = project_dir.join("icedb.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `icedb.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<IcedbConfig, ConfigError> {
    let config: IcedbConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &IcedbConfig) -> Result<(), ConfigError> {
    if config.device.name.is_empty() {
        return Err(ConfigError::MissingField("device.name".to_string()));
    }
    if config.device.package.is_empty() {
        return Err(ConfigError::MissingField("device.package".to_string()));
    }
    if config.device.chipdb.as_deref() == Some("") {
        return Err(ConfigError::ValidationError(
            "device.chipdb must not be empty".to_string(),
        ));
    }
    Ok(())
}
