use thiserror::Error;

use super::settings::SelectedCountry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountryError {
    #[error("unknown country code {0}")]
    Unknown(String),
    #[error("{zone} is not a time zone of {country}")]
    ZoneNotInCountry { zone: String, country: String },
}

pub struct Country {
    pub id: &'static str,
    pub name: &'static str,
    /// IANA zones, primary first
    pub zones: &'static [&'static str],
}

const fn c(id: &'static str, name: &'static str, zones: &'static [&'static str]) -> Country {
    Country { id, name, zones }
}

/// ISO 3166 alpha-2 code → zones, tz database order.
pub static COUNTRIES: &[Country] = &[
    c("AE", "United Arab Emirates", &["Asia/Dubai"]),
    c("AR", "Argentina", &["America/Argentina/Buenos_Aires", "America/Argentina/Cordoba", "America/Argentina/Salta"]),
    c("AT", "Austria", &["Europe/Vienna"]),
    c("AU", "Australia", &["Australia/Sydney", "Australia/Melbourne", "Australia/Brisbane", "Australia/Adelaide", "Australia/Perth", "Australia/Darwin", "Australia/Hobart"]),
    c("BD", "Bangladesh", &["Asia/Dhaka"]),
    c("BE", "Belgium", &["Europe/Brussels"]),
    c("BG", "Bulgaria", &["Europe/Sofia"]),
    c("BR", "Brazil", &["America/Sao_Paulo", "America/Manaus", "America/Fortaleza", "America/Recife", "America/Belem"]),
    c("CA", "Canada", &["America/Toronto", "America/Vancouver", "America/Edmonton", "America/Winnipeg", "America/Halifax", "America/St_Johns"]),
    c("CH", "Switzerland", &["Europe/Zurich"]),
    c("CL", "Chile", &["America/Santiago", "Pacific/Easter"]),
    c("CN", "China", &["Asia/Shanghai", "Asia/Urumqi"]),
    c("CO", "Colombia", &["America/Bogota"]),
    c("CZ", "Czechia", &["Europe/Prague"]),
    c("DE", "Germany", &["Europe/Berlin", "Europe/Busingen"]),
    c("DK", "Denmark", &["Europe/Copenhagen"]),
    c("EG", "Egypt", &["Africa/Cairo"]),
    c("ES", "Spain", &["Europe/Madrid", "Africa/Ceuta", "Atlantic/Canary"]),
    c("FI", "Finland", &["Europe/Helsinki"]),
    c("FR", "France", &["Europe/Paris"]),
    c("GB", "United Kingdom", &["Europe/London"]),
    c("GR", "Greece", &["Europe/Athens"]),
    c("HK", "Hong Kong", &["Asia/Hong_Kong"]),
    c("HU", "Hungary", &["Europe/Budapest"]),
    c("ID", "Indonesia", &["Asia/Jakarta", "Asia/Pontianak", "Asia/Makassar", "Asia/Jayapura"]),
    c("IE", "Ireland", &["Europe/Dublin"]),
    c("IL", "Israel", &["Asia/Jerusalem"]),
    c("IN", "India", &["Asia/Kolkata"]),
    c("IT", "Italy", &["Europe/Rome"]),
    c("JP", "Japan", &["Asia/Tokyo"]),
    c("KE", "Kenya", &["Africa/Nairobi"]),
    c("KR", "South Korea", &["Asia/Seoul"]),
    c("MX", "Mexico", &["America/Mexico_City", "America/Cancun", "America/Monterrey", "America/Tijuana"]),
    c("MY", "Malaysia", &["Asia/Kuala_Lumpur", "Asia/Kuching"]),
    c("NG", "Nigeria", &["Africa/Lagos"]),
    c("NL", "Netherlands", &["Europe/Amsterdam"]),
    c("NO", "Norway", &["Europe/Oslo"]),
    c("NZ", "New Zealand", &["Pacific/Auckland", "Pacific/Chatham"]),
    c("PH", "Philippines", &["Asia/Manila"]),
    c("PK", "Pakistan", &["Asia/Karachi"]),
    c("PL", "Poland", &["Europe/Warsaw"]),
    c("PT", "Portugal", &["Europe/Lisbon", "Atlantic/Madeira", "Atlantic/Azores"]),
    c("RO", "Romania", &["Europe/Bucharest"]),
    c("RU", "Russia", &["Europe/Moscow", "Europe/Kaliningrad", "Asia/Yekaterinburg", "Asia/Novosibirsk", "Asia/Vladivostok"]),
    c("SA", "Saudi Arabia", &["Asia/Riyadh"]),
    c("SE", "Sweden", &["Europe/Stockholm"]),
    c("SG", "Singapore", &["Asia/Singapore"]),
    c("TH", "Thailand", &["Asia/Bangkok"]),
    c("TR", "Turkey", &["Europe/Istanbul"]),
    c("TW", "Taiwan", &["Asia/Taipei"]),
    c("UA", "Ukraine", &["Europe/Kyiv"]),
    c("US", "United States", &["America/New_York", "America/Chicago", "America/Denver", "America/Phoenix", "America/Los_Angeles", "America/Anchorage", "Pacific/Honolulu"]),
    c("VN", "Vietnam", &["Asia/Ho_Chi_Minh"]),
    c("ZA", "South Africa", &["Africa/Johannesburg"]),
];

pub fn find(id: &str) -> Option<&'static Country> {
    let id = id.trim();
    COUNTRIES.iter().find(|c| c.id.eq_ignore_ascii_case(id))
}

/// First zone of the country, the one shown when only the id is known.
pub fn primary_zone(id: &str) -> Option<&'static str> {
    find(id).and_then(|c| c.zones.first().copied())
}

/// Resolve a user's pick. Without `zone` the primary zone is used; with one
/// it must belong to the country.
pub fn choose(id: &str, zone: Option<&str>) -> Result<SelectedCountry, CountryError> {
    let country = find(id).ok_or_else(|| CountryError::Unknown(id.to_string()))?;
    let zone = match zone {
        None => country.zones[0],
        Some(z) => country
            .zones
            .iter()
            .copied()
            .find(|known| *known == z)
            .ok_or_else(|| CountryError::ZoneNotInCountry {
                zone: z.to_string(),
                country: country.name.to_string(),
            })?,
    };
    Ok(SelectedCountry {
        id: country.id.to_string(),
        name: country.name.to_string(),
        timezone: Some(zone.to_string()),
    })
}
