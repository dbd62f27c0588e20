//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert!(config.routes.is_empty());
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_routes_and_metadata() {
        let config = parse_config(
            r#"
            environment = "production"

            [routing]
            trie_cache_path = "/tmp/trie.json"

            [[routes]]
            name = "users.show"
            methods = ["GET"]
            path = "/users/{id:int}"
            handler = "UserController@show"
            metadata = { auth = true, roles = ["admin"] }
            "#,
        )
        .unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.routing.trie_cache_path, "/tmp/trie.json");
        assert_eq!(config.routes[0].metadata["roles"], serde_json::json!(["admin"]));
    }

    #[test]
    fn test_parse_and_validation_errors() {
        assert!(matches!(parse_config("routes = 3"), Err(ConfigError::Parse(_))));

        let err = parse_config(
            r#"
            [[routes]]
            path = "users"
            handler = "h"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.toml");
        std::fs::write(&path, "[listener]\nbind_address = \"0.0.0.0:9000\"\n").unwrap();
        assert_eq!(load_config(&path).unwrap().listener.bind_address, "0.0.0.0:9000");
        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
