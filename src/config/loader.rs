//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::PortalConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<PortalConfig, ConfigError> {
    let config: PortalConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PortalConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Load the file if it exists, otherwise fall back to the built-in deployment.
pub fn load_or_default(path: &Path) -> Result<PortalConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::warn!(path = ?path, "Config file not found, using defaults");
        Ok(PortalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("poke_portal_loader_test.toml");
        fs::write(&path, "[network]\nchain_id = 31337\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.network.chain_id, 31337);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = Path::new("definitely/not/here/portal.toml");
        assert!(matches!(load_config(path), Err(ConfigError::Io(_))));

        let config = load_or_default(path).unwrap();
        assert_eq!(config.network.chain_id, 4);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[network\nchain_id = 1").unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("[contract]\naddress = \"nope\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: invalid contract address 'nope'"
        );
    }
}
