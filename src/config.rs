use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hub: HubConfig,
}

/// Hub connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Base URL of the hub's REST API
    #[serde(default = "default_url")]
    pub url: String,
    /// Long-lived access token, forwarded as a bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Seconds between automatic snapshot refreshes
    #[serde(default = "default_refresh_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: None,
            refresh_interval_secs: default_refresh_secs(),
        }
    }
}

fn default_url() -> String {
    "http://127.0.0.1:8123".to_string()
}

fn default_refresh_secs() -> u64 {
    30
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "paddisense", "PaddiSense Panel")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration, writing a default file on first run so the hub
    /// settings are discoverable. `PADDISENSE_HUB_URL` overrides the
    /// configured hub URL without being persisted.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        if let Ok(url) = std::env::var("PADDISENSE_HUB_URL") {
            if !url.trim().is_empty() {
                config.hub.url = url;
            }
        }

        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("No configuration file found, writing defaults to {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!("Failed to write default configuration: {}", e);
            }
            Ok(config)
        }
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.hub.url, "http://127.0.0.1:8123");
        assert_eq!(config.hub.token, None);
        assert_eq!(config.hub.refresh_interval_secs, 30);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str("[hub]\nurl = \"http://hub.farm:8123\"\n").unwrap();
        assert_eq!(config.hub.url, "http://hub.farm:8123");
        assert_eq!(config.hub.refresh_interval_secs, 30);
    }

    #[test]
    fn test_first_load_writes_default_file() {
        let dir = std::env::temp_dir().join(format!("paddisense-panel-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = std::fs::remove_dir_all(&dir);

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.hub.url, "http://127.0.0.1:8123");
        assert!(path.exists(), "defaults written on first load");

        // The written file loads back to the same settings.
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.hub.url, config.hub.url);
        assert_eq!(reloaded.hub.refresh_interval_secs, config.hub.refresh_interval_secs);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
