//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayChainConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RelayChainConfig, ConfigError> {
    let config: RelayChainConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayChainConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.front_door.default_payload, "Hello world!");
        assert_eq!(config.auth_service.bind_address, "127.0.0.1:3001");
        assert_eq!(config.transform_service.bind_address, "127.0.0.1:3002");
        assert!(config.relay.auth_address.is_none());
        assert!(!config.protocol.extended_status);
    }

    #[test]
    fn partial_sections_override_defaults() {
        let config = parse_config(
            r#"
            [front_door]
            bind_address = "127.0.0.1:9000"

            [relay]
            auth_address = "10.0.0.5:3001"

            [protocol]
            extended_status = true
            "#,
        )
        .unwrap();

        assert_eq!(config.front_door.bind_address, "127.0.0.1:9000");
        assert_eq!(config.front_door.max_body_size, 2 * 1024 * 1024);
        assert_eq!(config.relay.auth_address.as_deref(), Some("10.0.0.5:3001"));
        assert!(config.protocol.extended_status);
    }

    #[test]
    fn invalid_values_surface_as_validation_error() {
        let err = parse_config(
            r#"
            [auth_service]
            secret = [1, 2, 3]

            [timeouts]
            read_ms = 0
            "#,
        )
        .unwrap_err();

        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = parse_config("[front_door").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("relay-chain-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[transform_service]\nmax_connections = 8\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.transform_service.max_connections, 8);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/relay-chain.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
