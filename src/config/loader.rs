//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl ProxyConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProxyConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = ProxyConfig::from_toml_str(&content)?;

    tracing::debug!(path = ?path, base_url = %config.upstream.base_url, "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn test_parse_partial_config() {
        let config = ProxyConfig::from_toml_str(
            r#"
            [upstream]
            base_url = "https://api.example.com/v2"
            timeout_secs = 5

            [response]
            transfer_headers = ["Set-Cookie", "X-Request-Id"]

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "https://api.example.com/v2");
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.upstream.pool_idle_timeout_secs, 90);
        assert_eq!(config.limits.max_upload_size, 32 << 20);
        assert_eq!(config.response.transfer_headers.len(), 2);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_validation_error_surfaces() {
        let err = ProxyConfig::from_toml_str("[limits]\nmax_upload_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("limits.max_upload_size"));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = ProxyConfig::from_toml_str("[upstream]\ntimeout_secs = 0\n[limits]\nmax_form_size = 0\n")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: upstream.timeout_secs must be greater than zero, \
             limits.max_form_size must be greater than zero"
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/api-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
