//! Configuration for the courier daemon.
//!
//! Layered loading: serde defaults, then an optional TOML file (path from
//! `COURIER_CONFIG`, falling back to `courier.toml` in the working
//! directory), then environment variable overrides. Defaults mirror the
//! service this daemon replaces: RPC on port 5000, messenger.com as the
//! platform base URL, a 25 MiB request cap, and `appstate.json` as the
//! session snapshot path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const MEGABYTES: u64 = 1024 * 1024;

const DEFAULT_BASE_URL: &str = "https://www.messenger.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.11; rv:43.0) Gecko/20100101 Firefox/43.0";

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourierConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub snapshot: SnapshotConfig,
}

/// RPC listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_payload_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_payload_size: 25 * MEGABYTES,
        }
    }
}

/// Platform client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Session snapshot persistence settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("appstate.json"),
        }
    }
}

impl CourierConfig {
    /// Load configuration from the default file locations and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|var| std::env::var(var).ok())
    }

    /// Parse a specific TOML file, with serde defaults filling the gaps.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `host:port` string for the RPC listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("COURIER_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let default_path = Path::new("courier.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("COURIER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("COURIER_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "COURIER_PORT",
                value: port,
            })?;
        }
        if let Some(base_url) = lookup("COURIER_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(user_agent) = lookup("COURIER_USER_AGENT") {
            self.provider.user_agent = user_agent;
        }
        if let Some(path) = lookup("COURIER_APPSTATE_PATH") {
            self.snapshot.path = PathBuf::from(path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_original_service() {
        let config = CourierConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_payload_size, 25 * MEGABYTES);
        assert_eq!(config.provider.base_url, "https://www.messenger.com");
        assert_eq!(config.snapshot.path, PathBuf::from("appstate.json"));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = CourierConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn from_file_fills_unspecified_sections_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[snapshot]
path = "/var/lib/courier/appstate.json"
"#
        )
        .unwrap();

        let config = CourierConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.snapshot.path,
            PathBuf::from("/var/lib/courier/appstate.json")
        );
        assert_eq!(config.provider.base_url, "https://www.messenger.com");
    }

    #[test]
    fn from_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbogus = true").unwrap();

        let err = CourierConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("COURIER_HOST", "0.0.0.0"),
            ("COURIER_PORT", "9000"),
            ("COURIER_BASE_URL", "https://mbasic.example.invalid"),
        ]
        .into_iter()
        .collect();

        let config =
            CourierConfig::load_with(|var| env.get(var).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.provider.base_url, "https://mbasic.example.invalid");
    }

    #[test]
    fn invalid_port_is_a_typed_error() {
        let err = CourierConfig::load_with(|var| {
            (var == "COURIER_PORT").then(|| "not-a-port".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "COURIER_PORT",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_without_env_falls_back_to_defaults() {
        let config = CourierConfig::load_with(no_env).unwrap();
        assert_eq!(config.server.port, 5000);
    }
}
