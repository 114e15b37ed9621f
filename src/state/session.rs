use chrono_tz::Tz;

use super::settings::{SelectedCountry, Settings, SettingsError, SettingsStore, SortSpec};
use super::status::StatusHub;
use crate::api::location::Location;
use crate::signals::time::resolve_zone;

/// Application state handed down from `main`: persisted settings plus the
/// session-scoped transaction status. All mutation goes through methods here.
pub struct Session {
    store: SettingsStore,
    settings: Settings,
    fallback_zone: String,
    pub status: StatusHub,
}

impl Session {
    /// Load settings from `store` once, at start.
    pub fn open(store: SettingsStore, fallback_zone: impl Into<String>) -> Self {
        let settings = store.load();
        Self {
            store,
            settings,
            fallback_zone: fallback_zone.into(),
            status: StatusHub::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn zone_name(&self) -> &str {
        self.settings.display_zone(&self.fallback_zone)
    }

    pub fn zone(&self) -> Tz {
        resolve_zone(self.zone_name())
    }

    /// A country is saved and its zone is known. A saved country whose zone
    /// cannot be derived counts as unset, so geolocation can replace it.
    pub fn has_country(&self) -> bool {
        self.settings.country_zone().is_some()
    }

    /// Overwrites whatever was saved.
    pub fn select_country(&mut self, country: SelectedCountry) -> Result<(), SettingsError> {
        tracing::info!(country = %country.id, zone = ?country.zone(), "country selected");
        self.settings.selected_country = Some(country);
        self.store.save(&self.settings)
    }

    pub fn clear_country(&mut self) -> Result<(), SettingsError> {
        self.settings.selected_country = None;
        self.store.save(&self.settings)
    }

    /// Seed the country from geolocation, only when nothing is saved yet.
    /// Returns whether the settings changed.
    pub fn seed_from_location(&mut self, location: &Location) -> Result<bool, SettingsError> {
        if self.has_country() {
            return Ok(false);
        }
        self.select_country(SelectedCountry {
            id: location.country_code.clone(),
            name: location.country.clone(),
            timezone: Some(location.timezone.clone()),
        })?;
        Ok(true)
    }

    pub fn set_sorting(&mut self, sorting: Vec<SortSpec>) -> Result<(), SettingsError> {
        self.settings.table_sorting = sorting;
        self.store.save(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::countries;

    fn japan() -> SelectedCountry {
        countries::choose("JP", None).unwrap()
    }

    fn session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("s.json"));
        (dir, Session::open(store, "Asia/Singapore"))
    }

    fn berlin() -> Location {
        Location {
            country_code: "DE".to_string(),
            country: "Germany".to_string(),
            timezone: "Europe/Berlin".to_string(),
        }
    }

    #[test]
    fn test_fallback_zone() {
        let (_dir, s) = session();
        assert_eq!(s.zone_name(), "Asia/Singapore");
        assert_eq!(s.zone(), Tz::Asia__Singapore);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let (dir, mut s) = session();
        assert!(s.seed_from_location(&berlin()).unwrap());
        assert_eq!(s.zone_name(), "Europe/Berlin");

        s.select_country(japan()).unwrap();
        assert!(!s.seed_from_location(&berlin()).unwrap());
        assert_eq!(s.zone_name(), "Asia/Tokyo");

        // persisted
        let reopened = Session::open(SettingsStore::new(dir.path().join("s.json")), "UTC");
        assert_eq!(reopened.zone_name(), "Asia/Tokyo");
        assert_eq!(reopened.settings().country_name(), "Japan");
    }

    #[test]
    fn test_clear_country() {
        let (_dir, mut s) = session();
        s.select_country(japan()).unwrap();
        s.clear_country().unwrap();
        assert!(!s.has_country());
        assert_eq!(s.zone_name(), "Asia/Singapore");
    }

    #[test]
    fn test_bad_saved_zone_renders_utc() {
        let (_dir, mut s) = session();
        s.select_country(SelectedCountry {
            id: "XX".to_string(),
            name: "Nowhere".to_string(),
            timezone: Some("Not/AZone".to_string()),
        })
        .unwrap();
        assert_eq!(s.zone(), Tz::UTC);
    }

    #[test]
    fn test_saved_country_without_zone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"selectedCountryData":{"id":"DE","name":"Germany"}}"#).unwrap();

        let s = Session::open(SettingsStore::new(&path), "Asia/Singapore");
        assert!(s.has_country());
        assert_eq!(s.zone(), Tz::Europe__Berlin);
    }

    #[test]
    fn test_underivable_country_is_reseeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"selectedCountryData":{"id":"XX","name":"Nowhere"}}"#).unwrap();

        let mut s = Session::open(SettingsStore::new(&path), "Asia/Singapore");
        assert!(!s.has_country());
        assert!(s.seed_from_location(&berlin()).unwrap());
        assert_eq!(s.settings().country_name(), "Germany");
        assert_eq!(s.zone_name(), "Europe/Berlin");
    }
}
