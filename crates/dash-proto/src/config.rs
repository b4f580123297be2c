use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Local client configuration, stored as TOML under the platform config dir.
///
/// This is the client's own config; the receiver's configuration (spacecraft,
/// downlink, poll interval, ...) is fetched from `GET /api` at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub receiver: ReceiverEndpoint,
    #[serde(default)]
    pub schedule: ScheduleSource,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverEndpoint {
    /// Base URL of the xrit-rx HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Override for the receiver-provided poll interval, in seconds.
    /// None means honour the interval from `GET /api`.
    #[serde(default)]
    pub interval_override_secs: Option<u64>,
}

/// DOP schedule source. The KMA API carries no CORS headers, so the upstream
/// dashboard proxies it; the proxy also works fine for a native client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSource {
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default EnvFilter directive when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:1692".to_string()
}

fn default_proxy_url() -> String {
    "https://vksdr.com/scripts/kma-dop.php".to_string()
}

fn default_log_filter() -> String {
    "info,dash_client=debug".to_string()
}

impl Default for ReceiverEndpoint {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_override_secs: None,
        }
    }
}

impl Default for ScheduleSource {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            receiver: ReceiverEndpoint::default(),
            schedule: ScheduleSource::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.receiver.base_url, "http://127.0.0.1:1692");
        assert_eq!(config.receiver.interval_override_secs, None);
        assert!(config.schedule.proxy_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            "[receiver]\nbase_url = \"http://10.0.0.5:1692\"\n",
        )
        .unwrap();
        assert_eq!(config.receiver.base_url, "http://10.0.0.5:1692");
        assert!(config.schedule.proxy_url.contains("kma-dop"));
    }
}
