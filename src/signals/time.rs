use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timestamps from the signal service: `yyyy.MM.dd HH:mm:ss` at UTC+1.
pub const SOURCE_FORMAT: &str = "%Y.%m.%d %H:%M:%S";
const SOURCE_OFFSET_SECS: i32 = 3600;

pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID_DATE: &str = "Invalid Date";

/// Parse an IANA zone name; invalid names fall back to UTC.
pub fn resolve_zone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            tracing::warn!(zone = name, "invalid time zone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// Parse a service timestamp into a UTC instant.
pub fn parse_source(raw: &str) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(SOURCE_OFFSET_SECS)?;
    let naive = NaiveDateTime::parse_from_str(raw.trim(), SOURCE_FORMAT).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn format_instant(instant: DateTime<Utc>, zone: Tz) -> String {
    instant.with_timezone(&zone).format(DISPLAY_FORMAT).to_string()
}

/// Re-render a service timestamp in `zone`.
///
/// Missing or `N/A` input yields `N/A`; anything unparseable yields `Invalid Date`.
pub fn localize(raw: Option<&str>, zone: Tz) -> String {
    let raw = match raw.map(str::trim) {
        None | Some("") | Some(NOT_AVAILABLE) => return NOT_AVAILABLE.to_string(),
        Some(r) => r,
    };
    match parse_source(raw) {
        Some(instant) => format_instant(instant, zone),
        None => {
            tracing::debug!(raw, "unparseable timestamp");
            INVALID_DATE.to_string()
        }
    }
}

/// Render epoch millis in `zone`, `None` when out of range.
pub fn format_millis(millis: i64, zone: Tz) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| format_instant(dt, zone))
}

/// Parse a displayed timestamp back into wall-clock time (zone-less).
pub fn parse_display(displayed: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(displayed, DISPLAY_FORMAT).ok()
}
