//! Server configuration loading from file and environment variables.

use gatewire_acl::{AccessControlList, AclError};
use gatewire_observe::BroadcastConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event delivery settings.
    #[serde(default)]
    pub broadcast: BroadcastSettings,

    /// Consumer identity → permitted method rules.
    #[serde(default)]
    pub acl: BTreeMap<String, Vec<String>>,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gatewire_observe=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Per-subscriber delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastSettings {
    /// Events buffered per subscriber channel. Values below 1 are treated as 1.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Maximum time a publish waits on one subscriber, in milliseconds.
    /// `0` waits indefinitely.
    #[serde(default)]
    pub send_timeout_ms: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8082
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_channel_capacity() -> usize {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            send_timeout_ms: 0,
        }
    }
}

impl BroadcastSettings {
    pub fn to_broadcast_config(&self) -> BroadcastConfig {
        BroadcastConfig {
            channel_capacity: self.channel_capacity.max(1),
            send_timeout: (self.send_timeout_ms > 0)
                .then(|| Duration::from_millis(self.send_timeout_ms)),
        }
    }
}

impl Config {
    /// Validates the `[acl]` table and builds the access-control list.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Acl` for an empty identity or a malformed rule.
    pub fn access_control_list(&self) -> Result<AccessControlList, ConfigError> {
        Ok(AccessControlList::new(self.acl.clone())?)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// `GATEWIRE_ACL` is not a JSON object of string arrays.
    #[error("failed to parse GATEWIRE_ACL: {0}")]
    AclOverride(#[from] serde_json::Error),

    /// The access-control list is malformed.
    #[error("invalid access-control list: {0}")]
    Acl(#[from] AclError),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `GATEWIRE_HOST` overrides `server.host`
/// - `GATEWIRE_PORT` overrides `server.port`
/// - `GATEWIRE_LOG_LEVEL` overrides `logging.level`
/// - `GATEWIRE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `GATEWIRE_ACL` replaces the whole `[acl]` table with a JSON object
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed,
/// or if `GATEWIRE_ACL` is set to invalid JSON.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("GATEWIRE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("GATEWIRE_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("GATEWIRE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("GATEWIRE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(acl) = std::env::var("GATEWIRE_ACL") {
        config.acl = serde_json::from_str(&acl)?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.broadcast.channel_capacity, 1);
        assert!(config.acl.is_empty());
        assert_eq!(
            config.broadcast.to_broadcast_config(),
            BroadcastConfig::default()
        );
    }

    #[test]
    fn acl_table_is_parsed_and_validated() {
        let config: Config = toml::from_str(
            r#"
            [acl]
            "logger" = ["/main.Admin/Logging"]
            "biz_admin" = ["/main.Biz/*"]
            "#,
        )
        .unwrap();
        let acl = config.access_control_list().unwrap();
        assert_eq!(acl.len(), 2);
        assert!(acl.authorize("biz_admin", "/main.Biz/Test").is_ok());
        assert!(acl.authorize("logger", "/main.Biz/Test").is_err());
    }

    #[test]
    fn malformed_acl_rule_is_a_config_error() {
        let config: Config = toml::from_str(
            r#"
            [acl]
            "svc" = ["main.Biz/Check"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.access_control_list(),
            Err(ConfigError::Acl(AclError::InvalidRule { .. }))
        ));
    }

    #[test]
    fn send_timeout_zero_means_blocking() {
        let settings = BroadcastSettings {
            channel_capacity: 0,
            send_timeout_ms: 0,
        };
        let config = settings.to_broadcast_config();
        assert_eq!(config.channel_capacity, 1);
        assert_eq!(config.send_timeout, None);

        let settings = BroadcastSettings {
            channel_capacity: 8,
            send_timeout_ms: 250,
        };
        assert_eq!(
            settings.to_broadcast_config().send_timeout,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/gatewire.toml")).unwrap();
        assert_eq!(config.server.host, default_host());
    }
}
