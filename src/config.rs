use std::time::Duration;

use log::{info, warn};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            limit: default_limit(),
            timeout_secs: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/creators/search".to_string()
}

fn default_limit() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            debounce_ms: default_debounce_ms(),
            site_url: default_site_url(),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Loads the config at `config_path`, writing the defaults there when the file is missing.
/// An unreadable file falls back to the defaults and is left untouched.
pub fn load_config(config_path: &std::path::Path) -> Config {
    if !config_path.exists() {
        info!("No config found, creating default config");
        let default = Config::default();
        match serde_json::to_string_pretty(&default) {
            Ok(json) => {
                if let Err(e) = std::fs::write(config_path, json) {
                    warn!("Could not write default config to {:?}: {}", config_path, e);
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }
        return default;
    }
    let content = std::fs::read_to_string(config_path).unwrap_or_default();
    match serde_json::from_str::<Config>(&content) {
        Ok(c) => {
            info!("Config loaded from {:?}", config_path);
            c
        }
        Err(e) => {
            warn!("Config parse failed ({}), using defaults", e);
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.debounce_ms = 150;
        config.provider.api_key = Some("sk-test".into());
        config.provider.timeout_secs = Some(5);

        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.debounce(), Duration::from_millis(150));
        assert_eq!(restored.provider.api_key, Some("sk-test".into()));
        assert_eq!(restored.provider.timeout_secs, Some(5));
        assert_eq!(restored.provider.limit, 10);
    }

    #[test]
    fn test_config_backward_compat() {
        let minimal_json = r#"{ "provider": { "endpoint": "https://lagosweekender.com/api/creators/search" } }"#;
        let config: Config = serde_json::from_str(minimal_json).unwrap();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.provider.limit, 10);
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.site_url, "http://localhost:3000");
    }

    #[test]
    fn test_load_config_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = load_config(&path);
        assert_eq!(config.debounce_ms, 300);
        assert!(path.exists());

        let written: Config =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.provider.endpoint, config.provider.endpoint);
    }

    #[test]
    fn test_load_config_unwritable_dir_still_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("config.json");

        let config = load_config(&path);
        assert_eq!(config.debounce_ms, 300);
        assert!(!path.exists());
    }

    #[test]
    fn test_load_config_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = load_config(&path);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
