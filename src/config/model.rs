//! Configuration data model.
//!
//! [`SessionConfig`] is what a session runs with and never changes once the
//! session exists. [`AppConfig`] is the TOML file layout the binary loads;
//! every optional field has a default so a file only needs the channel,
//! username and token.

use anyhow::{anyhow, bail, Result};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Twitch's IRC host.
pub const DEFAULT_TWITCH_URI: &str = "irc.chat.twitch.tv";
/// Plaintext IRC port.
pub const DEFAULT_TWITCH_PORT: u16 = 6667;
/// TLS IRC port.
pub const DEFAULT_TWITCH_TLS_PORT: u16 = 443;
/// [`DEFAULT_TWITCH_URI`] and [`DEFAULT_TWITCH_PORT`] combined.
pub const DEFAULT_TWITCH_SERVER: &str = "irc.chat.twitch.tv:6667";
/// [`DEFAULT_TWITCH_URI`] and [`DEFAULT_TWITCH_TLS_PORT`] combined.
pub const DEFAULT_TWITCH_TLS_SERVER: &str = "irc.chat.twitch.tv:443";

/// Read deadline applied to every decode in the receive loop.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Capability requested after JOIN unless configured otherwise.
pub const DEFAULT_CAPABILITY: &str = "twitch.tv/commands";
/// `chrono` format for chat line timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Connection parameters for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Channel name without the leading `#`.
    pub channel: String,
    /// `host:port` to dial.
    pub server: String,
    pub username: String,
    /// OAuth token without the `oauth:` prefix.
    pub token: String,
    pub tls: bool,
    /// How long the receive loop waits for a frame before giving up.
    pub idle_timeout: Duration,
    /// Capabilities requested with `CAP REQ`, one frame each.
    pub capabilities: Vec<String>,
}

impl SessionConfig {
    /// Config for Twitch's default server, plain or TLS.
    pub fn twitch(
        channel: impl Into<String>,
        username: impl Into<String>,
        token: impl Into<String>,
        tls: bool,
    ) -> Self {
        let server = if tls {
            DEFAULT_TWITCH_TLS_SERVER
        } else {
            DEFAULT_TWITCH_SERVER
        };
        Self {
            channel: channel.into(),
            server: server.to_string(),
            username: username.into(),
            token: token.into(),
            tls,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            capabilities: vec![DEFAULT_CAPABILITY.to_string()],
        }
    }

    /// Host part of [`server`](Self::server), used as the TLS server name.
    pub fn host(&self) -> &str {
        match self.server.rsplit_once(':') {
            Some((host, port)) if port.parse::<u16>().is_ok() => host,
            _ => &self.server,
        }
    }

    /// Channel name with the `#` marker, as it appears on the wire.
    pub fn channel_target(&self) -> String {
        format!("#{}", self.channel)
    }
}

/// Root of the TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[session]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub channel: String,
    pub username: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_true")]
    pub tls: bool,
    /// Overrides the Twitch default picked from `tls`.
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl SessionSettings {
    pub fn to_session_config(&self) -> SessionConfig {
        let mut config =
            SessionConfig::twitch(&self.channel, &self.username, &self.token, self.tls);
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        config.idle_timeout = Duration::from_secs(self.idle_timeout_secs);
        config.capabilities = self.capabilities.clone();
        config
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Minimum `tracing` level: `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_level")]
    pub level: String,
    /// `chrono` format string for chat lines.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl LoggingConfig {
    /// Parsed [`level`](Self::level).
    pub fn max_level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(&self.level)
            .map_err(|_| anyhow!("unknown log level {:?}", self.level))
    }

    /// Reject a [`timestamp_format`](Self::timestamp_format) chrono cannot render.
    pub fn check_timestamp_format(&self) -> Result<()> {
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            bail!("invalid timestamp format {:?}", self.timestamp_format);
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}
fn default_capabilities() -> Vec<String> {
    vec![DEFAULT_CAPABILITY.to_string()]
}
fn default_level() -> String {
    "info".to_string()
}
fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}
