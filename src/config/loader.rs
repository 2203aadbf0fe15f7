//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{ProxyConfig, UpstreamConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the LDBWS access token.
pub const ACCESS_TOKEN_ENV: &str = "LDBWS_ACCESS_TOKEN";

/// Token file looked up in the home directory when no path is configured.
pub const DEFAULT_TOKEN_FILE: &str = ".ldbws-access-token";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("no access token: set LDBWS_ACCESS_TOKEN, upstream.access_token or create {}", .0.display())]
    MissingAccessToken(PathBuf),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` if given, otherwise validate the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Resolve the access token from the process environment, the config, or
/// the token file, in that order.
pub fn resolve_access_token(config: &UpstreamConfig) -> Result<String, ConfigError> {
    resolve_access_token_with(std::env::var(ACCESS_TOKEN_ENV).ok(), config)
}

/// Same as [`resolve_access_token`] with the environment value supplied.
pub fn resolve_access_token_with(
    env_token: Option<String>,
    config: &UpstreamConfig,
) -> Result<String, ConfigError> {
    let inline = env_token
        .into_iter()
        .chain(config.access_token.clone())
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty());
    if let Some(token) = inline {
        return Ok(token);
    }

    let path = token_file_path(config);
    match fs::read_to_string(&path) {
        Ok(contents) if !contents.trim().is_empty() => Ok(contents.trim().to_string()),
        Ok(_) => Err(ConfigError::MissingAccessToken(path)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::MissingAccessToken(path))
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

fn token_file_path(config: &UpstreamConfig) -> PathBuf {
    match &config.access_token_path {
        Some(path) => PathBuf::from(path),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(DEFAULT_TOKEN_FILE),
    }
}
