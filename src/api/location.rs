use serde::Deserialize;

use super::{ApiClient, ApiError};

/// IP geolocation lookup, used to seed the display zone.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub timezone: Option<LocationZone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationZone {
    pub id: String,
}

/// Usable result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country_code: String,
    pub country: String,
    pub timezone: String,
}

impl LocationResponse {
    /// `None` unless the service reports success and a zone id.
    pub fn into_location(self) -> Option<Location> {
        if !self.success {
            return None;
        }
        let timezone = self.timezone?.id;
        let country = self.country.unwrap_or_default();
        Some(Location {
            country_code: self.country_code.unwrap_or_else(|| country.clone()),
            country,
            timezone,
        })
    }
}

impl ApiClient {
    /// Look up the caller's country and zone. `Ok(None)` when the service declines.
    pub async fn fetch_location(&self) -> Result<Option<Location>, ApiError> {
        let url = self.endpoints().location_url.clone();
        let value = self.get_json(&url).await?;
        let response: LocationResponse =
            serde_json::from_value(value).map_err(|source| ApiError::Decode { url, source })?;
        let location = response.into_location();
        if location.is_none() {
            tracing::info!("location lookup unsuccessful");
        }
        Ok(location)
    }
}
