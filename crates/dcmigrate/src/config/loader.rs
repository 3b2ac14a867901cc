use std::path::Path;

use crate::config::schema::MigrationConfig;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MigrationConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<MigrationConfig, ConfigError> {
    let config: MigrationConfig = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &MigrationConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let names = [
        ("state_extension", &config.state_extension),
        ("pyramid_extension", &config.pyramid_extension),
        ("content_directory", &config.content_directory),
        ("pyramid_directory_suffix", &config.pyramid_directory_suffix),
        ("temp_prefix", &config.temp_prefix),
    ];

    for (key, value) in names {
        if value.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("'{}' must not be empty", key),
            });
        }
        if value.contains('/') || value.contains('\\') {
            return Err(ConfigError::Validation {
                message: format!("'{}' must not contain path separators: {}", key, value),
            });
        }
        if value.starts_with('.') {
            return Err(ConfigError::Validation {
                message: format!("'{}' must not start with a dot: {}", key, value),
            });
        }
    }

    Ok(())
}
