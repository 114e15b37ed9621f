use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::countries;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Country picked by the user (or seeded from geolocation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCountry {
    pub id: String,
    pub name: String,
    /// IANA zone the display times are rendered in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl SelectedCountry {
    /// Saved zone, else the country's primary zone.
    pub fn zone(&self) -> Option<&str> {
        self.timezone
            .as_deref()
            .filter(|z| !z.trim().is_empty())
            .or_else(|| countries::primary_zone(&self.id))
    }
}

/// One entry of a table's sort state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub id: String,
    #[serde(default)]
    pub desc: bool,
}

/// UI preferences that outlive a session.
/// Keys match what the web dashboard kept in local storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "selectedCountryData", default, skip_serializing_if = "Option::is_none")]
    pub selected_country: Option<SelectedCountry>,

    #[serde(rename = "cryptoTableSorting", default)]
    pub table_sorting: Vec<SortSpec>,

    /// Session token; only its presence is checked
    #[serde(rename = "secure_token", default, skip_serializing_if = "Option::is_none")]
    pub secure_token: Option<String>,
}

impl Settings {
    pub fn is_signed_in(&self) -> bool {
        self.secure_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Zone to render times in: the saved country's zone, else `fallback`.
    pub fn display_zone<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.country_zone().unwrap_or(fallback)
    }

    /// `None` when no country is saved or its zone cannot be derived.
    pub fn country_zone(&self) -> Option<&str> {
        self.selected_country.as_ref().and_then(SelectedCountry::zone)
    }

    pub fn country_name(&self) -> &str {
        self.selected_country
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown")
    }
}

/// File-backed settings. Loaded once at start, saved on every user change.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield defaults; corruption is logged, not fatal.
    pub fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read settings");
                return Settings::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt settings, ignoring");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, raw).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_default() {
        let (_dir, store) = store();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, store) = store();
        let settings = Settings {
            selected_country: Some(SelectedCountry {
                id: "DE".to_string(),
                name: "Germany".to_string(),
                timezone: Some("Europe/Berlin".to_string()),
            }),
            table_sorting: vec![SortSpec {
                id: "currentPrice".to_string(),
                desc: true,
            }],
            secure_token: None,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_storage_keys() {
        let settings = Settings {
            selected_country: Some(SelectedCountry {
                id: "SG".to_string(),
                name: "Singapore".to_string(),
                timezone: None,
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["selectedCountryData"]["id"], "SG");
        assert!(json["cryptoTableSorting"].as_array().unwrap().is_empty());
        assert!(json.get("secure_token").is_none());
    }

    #[test]
    fn test_corrupt_file_is_default() {
        let (_dir, store) = store();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn test_display_zone_and_country() {
        let mut settings = Settings::default();
        assert_eq!(settings.display_zone("UTC"), "UTC");
        assert_eq!(settings.country_name(), "Unknown");

        settings.selected_country = Some(SelectedCountry {
            id: "JP".to_string(),
            name: "Japan".to_string(),
            timezone: Some("Asia/Tokyo".to_string()),
        });
        assert_eq!(settings.display_zone("UTC"), "Asia/Tokyo");
        assert_eq!(settings.country_name(), "Japan");
    }

    #[test]
    fn test_zone_derived_from_country_id() {
        let (_dir, store) = store();
        fs::write(
            store.path(),
            r#"{"selectedCountryData":{"id":"DE","name":"Germany"}}"#,
        )
        .unwrap();
        let settings = store.load();
        assert_eq!(settings.country_name(), "Germany");
        assert_eq!(settings.country_zone(), Some("Europe/Berlin"));
        assert_eq!(settings.display_zone("Asia/Singapore"), "Europe/Berlin");

        let unknown = Settings {
            selected_country: Some(SelectedCountry {
                id: "XX".to_string(),
                name: "Nowhere".to_string(),
                timezone: None,
            }),
            ..Default::default()
        };
        assert_eq!(unknown.country_zone(), None);
        assert_eq!(unknown.display_zone("UTC"), "UTC");
    }

    #[test]
    fn test_signed_in() {
        let mut settings = Settings::default();
        assert!(!settings.is_signed_in());
        settings.secure_token = Some(String::new());
        assert!(!settings.is_signed_in());
        settings.secure_token = Some("abc".to_string());
        assert!(settings.is_signed_in());
    }
}
