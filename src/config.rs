//! Service configuration.
//!
//! Loaded from `config.yaml` when present, otherwise built-in defaults that
//! match the service's historical layout (port 5001, `data.json`,
//! `notifications.txt` in the working directory). `PHARMACY_*` environment
//! variables override either source.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AgentError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON document holding every captured patient.
    pub data_file: PathBuf,
    /// Append-only text log read back by `GET /notifications`.
    pub notifications_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_file: PathBuf::from("data.json"),
            notifications_file: PathBuf::from("notifications.txt"),
        }
    }
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            AgentError::Config(format!("host is not an IP address: {}", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Applies `PHARMACY_*` overrides using `lookup` as the variable source.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PHARMACY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PHARMACY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AgentError::Config(format!("PHARMACY_PORT is not a port: {}", port)))?;
        }
        if let Some(path) = lookup("PHARMACY_DATA_FILE") {
            self.storage.data_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("PHARMACY_NOTIFICATIONS_FILE") {
            self.storage.notifications_file = PathBuf::from(path);
        }
        Ok(())
    }
}

/// Reads `path` if it exists, then layers environment overrides on top.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        parse_config(&raw)?
    } else {
        Config::default()
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn parse_config(raw: &str) -> Result<Config> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_legacy_layout() {
        let config = Config::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.storage.data_file, PathBuf::from("data.json"));
        assert_eq!(config.storage.notifications_file, PathBuf::from("notifications.txt"));
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:5001".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = parse_config("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PHARMACY_PORT", "6000"),
            ("PHARMACY_DATA_FILE", "/tmp/patients.json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 6000);
        assert_eq!(config.storage.data_file, PathBuf::from("/tmp/patients.json"));
        assert_eq!(config.storage.notifications_file, PathBuf::from("notifications.txt"));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "PHARMACY_PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let mut config = Config::default();
        config.server.host = "localhost:99".to_string();
        assert!(config.socket_addr().is_err());
    }
}
