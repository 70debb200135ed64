pub mod model;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, LoggingConfig, SessionConfig, SessionSettings};

/// Environment variable consulted when the config file carries no token.
pub const TOKEN_ENV: &str = "BIRC_OAUTH_TOKEN";

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("birc")
        .join("config.toml")
}

/// Load the config from `path`, or from [`config_path`] when `None`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .logging
        .max_level()
        .and_then(|_| config.logging.check_timestamp_format())
        .with_context(|| format!("Invalid [logging] section in {}", path.display()))?;

    if config.session.token.is_empty() {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.session.token = token;
        }
    }
    Ok(config)
}
