use crate::app::{APP, ORG, QUALIFIER};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_API_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

pub const ENV_API_URL: &str = "PHOTOREEL_API_URL";
pub const ENV_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";
pub const ENV_DATA_DIR: &str = "PHOTOREEL_DATA_DIR";
pub const ENV_CONFIG_DIR: &str = "PHOTOREEL_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub access_key: Option<String>,
    pub items_per_page: u32,
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_key: None,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            download_dir: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
            return Ok(PathBuf::from(dir));
        }
        let directories = directories::ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or(anyhow!("can't resolve configuration directory"))?;
        Ok(directories.config_dir().to_path_buf())
    }

    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return Ok(PathBuf::from(dir));
        }
        let directories = directories::ProjectDirs::from(QUALIFIER, ORG, APP)
            .ok_or(anyhow!("can't resolve data directory"))?;
        Ok(directories.data_dir().to_path_buf())
    }

    /// Loads the configuration file and applies environment overrides.
    pub fn config() -> Config {
        let mut config = match Self::config_dir() {
            Ok(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            Err(e) => {
                log::info!("errors loading config: {e}");
                Config::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn load_from(path: &Path) -> Config {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("invalid config {}: {e}, using defaults", path.display());
                Config::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                log::warn!("failed to read config {}: {e}", path.display());
                Config::default()
            }
        }
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_url) = lookup(ENV_API_URL) {
            self.api_url = api_url;
        }
        if let Some(access_key) = lookup(ENV_ACCESS_KEY).filter(|k| !k.is_empty()) {
            self.access_key = Some(access_key);
        }
        if self.items_per_page == 0 {
            log::warn!("items_per_page must be positive, using {DEFAULT_ITEMS_PER_PAGE}");
            self.items_per_page = DEFAULT_ITEMS_PER_PAGE;
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }
        directories::UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(|p| p.join(APP)))
            .unwrap_or_else(|| PathBuf::from("downloads"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, Config::default());
        assert_eq!(config.items_per_page, 10);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"items_per_page": 25}"#).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.items_per_page, 25);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "http://localhost:1234"),
            (ENV_ACCESS_KEY, "secret"),
        ]);
        let mut config = Config {
            items_per_page: 0,
            ..Config::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(config.access_key.as_deref(), Some("secret"));
        assert_eq!(config.items_per_page, DEFAULT_ITEMS_PER_PAGE);
    }
}
