use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::model::Signal;
use super::time::{localize, parse_source};
use super::tokens::TokenDirectory;

/// Hit-time sentinel used by the service and in the table.
pub const NOT_REACHED: &str = "Not Reached";

/// A signal plus the display fields derived from it.
#[derive(Debug, Clone)]
pub struct SignalRow {
    pub signal: Signal,
    /// Base symbol, `CAKE` for `CAKE/USDT`
    pub symbol: String,
    /// Token name, or the symbol when the directory has none
    pub asset_name: String,
    pub short_address: Option<String>,
    pub predicted_at: String,
    pub expires_at: String,
    pub hit_time: String,
    /// Sort keys for the time columns
    pub predicted_ts: Option<DateTime<Utc>>,
    pub expiry_ts: Option<DateTime<Utc>>,
    pub hit_ts: Option<DateTime<Utc>>,
}

impl SignalRow {
    /// `PANCAKESWAP (CAKE)`
    pub fn asset_label(&self) -> String {
        format!("{} ({})", self.asset_name, self.symbol).to_uppercase()
    }

    pub fn pair_name(&self) -> &str {
        &self.signal.pair_name
    }

    /// What the signal column shows: `Buy - Reached`, `Buy` or `No Action`.
    pub fn signal_label(&self) -> &'static str {
        match (&self.signal.signal, self.signal.hit_status.is_reached()) {
            (super::SignalKind::Buy, true) => "Buy - Reached",
            (super::SignalKind::Buy, false) => "Buy",
            _ => "No Action",
        }
    }
}

/// Shorten long hex strings to `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 10 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        address.to_string()
    }
}

/// Base symbol of a `BASE/QUOTE` pair.
pub fn base_symbol(pair_name: &str) -> &str {
    pair_name.split('/').next().unwrap_or(pair_name)
}

fn is_not_reached(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") => true,
        Some(r) => r == NOT_REACHED,
    }
}

pub fn normalize_one(signal: Signal, tokens: &TokenDirectory, zone: Tz) -> SignalRow {
    let symbol = base_symbol(&signal.pair_name).to_string();
    let asset_name = tokens.name_or_symbol(&symbol).to_string();
    let short_address = signal.pair_address.as_deref().map(short_address);

    let predicted_at = localize(signal.predicted_time.as_deref(), zone);
    let expires_at = localize(signal.expiry_time.as_deref(), zone);

    let (hit_time, hit_ts) = if is_not_reached(signal.hit_time.as_deref()) {
        (NOT_REACHED.to_string(), None)
    } else {
        (
            localize(signal.hit_time.as_deref(), zone),
            signal.hit_time.as_deref().and_then(parse_source),
        )
    };

    let predicted_ts = signal.predicted_time.as_deref().and_then(parse_source);
    let expiry_ts = signal.expiry_time.as_deref().and_then(parse_source);

    SignalRow {
        signal,
        symbol,
        asset_name,
        short_address,
        predicted_at,
        expires_at,
        hit_time,
        predicted_ts,
        expiry_ts,
        hit_ts,
    }
}

/// Map a fetched batch to display rows. Field-level failures degrade to
/// placeholder text and never drop a row.
pub fn normalize(signals: Vec<Signal>, tokens: &TokenDirectory, zone: Tz) -> Vec<SignalRow> {
    signals
        .into_iter()
        .map(|s| normalize_one(s, tokens, zone))
        .collect()
}
