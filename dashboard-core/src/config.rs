use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::dates::MAX_DATE_RANGE_DAYS;
use crate::geocode::GeocoderId;

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Configuration for a keyed geocoding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub base_url: String,
    /// Passed through to the archive; `auto` resolves from coordinates.
    pub timezone: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_ARCHIVE_URL.to_string(), timezone: "auto".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300, min_query_len: 2, max_results: 10 }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// City id used when none is given on the command line.
    pub default_city: Option<String>,

    pub max_range_days: u64,

    pub archive: ArchiveConfig,

    pub search: SearchConfig,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: None,
            max_range_days: MAX_DATE_RANGE_DAYS,
            archive: ArchiveConfig::default(),
            search: SearchConfig::default(),
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-dashboard", "wxdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted user data such as custom cities.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn set_default_city(&mut self, city_id: &str) {
        self.default_city = Some(city_id.to_string());
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: GeocoderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present and non-empty.
    pub fn provider_api_key(&self, provider_id: GeocoderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, provider_id: GeocoderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_archive_window() {
        let cfg = Config::default();

        assert_eq!(cfg.max_range_days, 90);
        assert_eq!(cfg.archive.base_url, DEFAULT_ARCHIVE_URL);
        assert_eq!(cfg.archive.timezone, "auto");
        assert_eq!(cfg.search.debounce_ms, 300);
        assert_eq!(cfg.search.min_query_len, 2);
        assert_eq!(cfg.search.max_results, 10);
    }

    #[test]
    fn set_api_key_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(GeocoderId::OpenWeather, "OPEN_KEY".into());

        assert_eq!(cfg.provider_api_key(GeocoderId::OpenWeather), Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(GeocoderId::OpenWeather));
        assert!(!cfg.is_provider_configured(GeocoderId::GooglePlaces));
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(GeocoderId::GooglePlaces, "   ".into());

        assert!(!cfg.is_provider_configured(GeocoderId::GooglePlaces));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert!(cfg.default_city.is_none());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_default_city("london");
        cfg.upsert_provider_api_key(GeocoderId::OpenWeather, "KEY".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_city.as_deref(), Some("london"));
        assert_eq!(loaded.provider_api_key(GeocoderId::OpenWeather), Some("KEY"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_range_days = 30\n[search]\ndebounce_ms = 500\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.max_range_days, 30);
        assert_eq!(cfg.search.debounce_ms, 500);
        assert_eq!(cfg.search.max_results, 10);
        assert_eq!(cfg.archive.base_url, DEFAULT_ARCHIVE_URL);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_range_days = \"many\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
