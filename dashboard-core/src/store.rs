//! Cities picked from search results, persisted as a flat JSON array.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{City, Config};

/// File stem shared with other dashboard front ends.
pub const CUSTOM_CITIES_KEY: &str = "weather-dashboard-custom-cities";

#[derive(Debug, Clone)]
pub struct CustomCityStore {
    path: PathBuf,
}

impl CustomCityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in `dir`, under the fixed storage key.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{CUSTOM_CITIES_KEY}.json")))
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::in_dir(&Config::data_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable store is moved before it gets overwritten.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    /// All saved cities. A missing or unreadable file counts as empty.
    pub fn list(&self) -> Vec<City> {
        self.read().unwrap_or_else(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "error loading custom cities");
            Vec::new()
        })
    }

    fn read(&self) -> Result<Vec<City>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read custom cities file: {}", self.path.display())
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!("Failed to parse custom cities file: {}", self.path.display())
        })
    }

    /// Current cities for a read-modify-write. An unreadable file is moved to
    /// [`backup_path`](Self::backup_path) so the next write cannot erase it.
    fn read_for_update(&self) -> Result<Vec<City>> {
        match self.read() {
            Ok(cities) => Ok(cities),
            Err(e) => {
                let backup = self.backup_path();
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "custom cities file unreadable, moving it aside"
                );
                fs::rename(&self.path, &backup).with_context(|| {
                    format!("Failed to back up custom cities file: {}", backup.display())
                })?;
                Ok(Vec::new())
            }
        }
    }

    /// Adds a city unless one with the same id is already stored.
    /// Returns whether anything was written.
    pub fn save(&self, city: &City) -> Result<bool> {
        let mut cities = self.read_for_update()?;
        if cities.iter().any(|c| c.id == city.id) {
            return Ok(false);
        }

        cities.push(city.clone());
        self.write(&cities)?;
        tracing::info!(id = %city.id, name = %city.name, "custom city saved");
        Ok(true)
    }

    /// Removes the city with `city_id`. Returns whether it was present.
    pub fn remove(&self, city_id: &str) -> Result<bool> {
        let cities = self.read_for_update()?;
        let before = cities.len();
        let kept: Vec<City> = cities.into_iter().filter(|c| c.id != city_id).collect();
        let removed = kept.len() != before;

        self.write(&kept)?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove custom cities file: {}", self.path.display())
            })?;
        }
        Ok(())
    }

    fn write(&self, cities: &[City]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(cities).context("Failed to serialize custom cities")?;

        // Write then rename so a crash never leaves a half-written store.
        let tmp = self.path.with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write custom cities file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to write custom cities file: {}", self.path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(id: &str, name: &str) -> City {
        let mut city = City::new(id, name, "Testland", 1.0, 2.0);
        city.is_custom = true;
        city
    }

    #[test]
    fn empty_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());

        assert!(store.list().is_empty());
        assert!(store.path().ends_with("weather-dashboard-custom-cities.json"));
    }

    #[test]
    fn save_skips_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(&dir.path().join("nested"));

        assert!(store.save(&custom("nominatim-1", "Ghent")).unwrap());
        assert!(!store.save(&custom("nominatim-1", "Gent")).unwrap());
        assert!(store.save(&custom("nominatim-2", "Bruges")).unwrap());

        let names: Vec<String> = store.list().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Ghent", "Bruges"]);
    }

    #[test]
    fn remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());
        store.save(&custom("a", "Aarhus")).unwrap();
        store.save(&custom("b", "Bergen")).unwrap();

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.list().len(), 1);

        store.clear().unwrap();
        assert!(store.list().is_empty());
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.list().is_empty());
    }

    #[test]
    fn saving_over_corrupt_file_keeps_a_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.save(&custom("a", "Aarhus")).unwrap());

        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), "{not json");
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());
        store.save(&custom("a", "Aarhus")).unwrap();
        store.remove("a").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["weather-dashboard-custom-cities.json"]);
    }

    #[test]
    fn reads_records_written_by_other_front_ends() {
        let dir = tempfile::tempdir().unwrap();
        let store = CustomCityStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"[{"id":"openweather-1-2","name":"Tartu","country":"EE","state":"","latitude":58.38,"longitude":26.72,"isCustom":true}]"#,
        )
        .unwrap();

        let cities = store.list();
        assert_eq!(cities.len(), 1);
        assert!(cities[0].is_custom);
        assert_eq!(cities[0].display_name(), "Tartu, EE");
    }
}
