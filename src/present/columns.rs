use chrono_tz::Tz;

use super::table::{serial_column, Column, SortKey, Table};
use crate::api::contract_status::{ContractEvent, EventKind};
use crate::signals::time::format_millis;
use crate::signals::{short_address, SignalKind, SignalRow};

const NA: &str = "N/A";

fn or_na(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => NA.to_string(),
    }
}

fn fixed(v: Option<f64>, places: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.places$}"),
        _ => NA.to_string(),
    }
}

fn parse_num(v: Option<&str>) -> Option<f64> {
    v.and_then(|s| s.trim().trim_end_matches('%').parse().ok())
}

fn millis(ts: Option<chrono::DateTime<chrono::Utc>>) -> SortKey {
    SortKey::Num(ts.map(|t| t.timestamp_millis() as f64))
}

/// Take-profit / stop-loss cells are only meaningful on Buy rows.
fn buy_only_percent(row: &SignalRow, value: Option<f64>) -> String {
    match (&row.signal.signal, value) {
        (SignalKind::Buy, Some(v)) => format!("{v:.3}%"),
        _ => NA.to_string(),
    }
}

pub fn signal_table() -> Table<SignalRow> {
    Table::new(vec![
        serial_column(),
        Column::new("pairName", "ASSET (SYMBOL)", |r: &SignalRow, _| r.asset_label())
            .sortable(|r| SortKey::Text(r.pair_name().to_string())),
        Column::new("pairAddress", "ASSET CONTRACT", |r: &SignalRow, _| {
            or_na(r.short_address.as_deref())
        }),
        Column::new(
            "currentPriceAtPredicition",
            "PREDICTION TIME PRICE (USDT)",
            |r: &SignalRow, _| fixed(r.signal.price_at_prediction.filter(|p| *p != 0.0), 8),
        )
        .sortable(|r| SortKey::Num(r.signal.price_at_prediction)),
        Column::new("target_price_usdt", "TARGET PRICE (USDT)", |r: &SignalRow, _| {
            match r.signal.combined_prediction {
                Some(p) if p != 0.0 && p.is_finite() => p.to_string(),
                _ => NA.to_string(),
            }
        })
        .sortable(|r| SortKey::Num(r.signal.combined_prediction)),
        Column::new("currentPrice", "CURRENT PRICE (USDT)", |r: &SignalRow, _| {
            fixed(parse_num(r.signal.current_price.as_deref()), 8)
        })
        .sortable(|r| SortKey::Num(parse_num(r.signal.current_price.as_deref()))),
        Column::new("now_diff_percent", "NOW DIFF(%)", |r: &SignalRow, _| {
            or_na(r.signal.now_diff_percent.as_deref())
        })
        .sortable(|r| SortKey::Num(parse_num(r.signal.now_diff_percent.as_deref()))),
        Column::new("signal", "SIGNAL", |r: &SignalRow, _| match r.signal.signal {
            SignalKind::Buy => r.signal_label().to_uppercase(),
            SignalKind::Hold => "NO ACTION".to_string(),
            ref other => other.as_str().to_uppercase(),
        })
        .sortable(|r| SortKey::Num(Some(r.signal.signal.priority() as f64))),
        Column::new("target_diff_percent", "TARGET DIFF(%)", |r: &SignalRow, _| {
            or_na(r.signal.target_diff_percent.as_deref())
        })
        .sortable(|r| SortKey::Num(parse_num(r.signal.target_diff_percent.as_deref()))),
        Column::new("takeProfitPercentage", "TP (%)", |r: &SignalRow, _| {
            buy_only_percent(r, r.signal.tp_percentage)
        })
        .sortable(|r| SortKey::Num(r.signal.tp_percentage)),
        Column::new("stopLossPercentage", "SL (%)", |r: &SignalRow, _| {
            buy_only_percent(r, r.signal.sl_percentage)
        })
        .sortable(|r| SortKey::Num(r.signal.sl_percentage)),
        Column::new("predictedTime", "Predicted At", |r: &SignalRow, _| r.predicted_at.clone())
            .sortable(|r| millis(r.predicted_ts)),
        Column::new("expiryTime", "Expires At", |r: &SignalRow, _| r.expires_at.clone())
            .sortable(|r| millis(r.expiry_ts)),
        Column::new("hit_status", "HIT STATUS", |r: &SignalRow, _| {
            r.signal.hit_status.as_str().to_string()
        })
        .sortable(|r| SortKey::Text(r.signal.hit_status.as_str().to_string())),
        Column::new("hit_time", "HIT TIME", |r: &SignalRow, _| r.hit_time.clone())
            .sortable(|r| millis(r.hit_ts)),
    ])
}

/// A contract event with its timestamp rendered in the display zone.
#[derive(Debug, Clone)]
pub struct ContractRow {
    pub event: ContractEvent,
    pub time: String,
}

impl ContractRow {
    pub fn new(event: ContractEvent, zone: Tz) -> Self {
        let time = event
            .timestamp
            .filter(|t| *t != 0)
            .and_then(|t| format_millis(t, zone))
            .unwrap_or_else(|| NA.to_string());
        Self { event, time }
    }

    pub fn from_events(events: Vec<ContractEvent>, zone: Tz) -> Vec<Self> {
        events.into_iter().map(|e| Self::new(e, zone)).collect()
    }

    fn is_token_added(&self) -> bool {
        self.event.kind == EventKind::TokenAdded
    }
}

fn short_or_na(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.is_empty() => short_address(s),
        _ => NA.to_string(),
    }
}

pub fn contract_table() -> Table<ContractRow> {
    Table::new(vec![
        Column::new("type", "EVENT TYPE", |r: &ContractRow, _| {
            r.event.kind.as_str().to_uppercase()
        })
        .sortable(|r| SortKey::Text(r.event.kind.as_str().to_string())),
        Column::new("tokenName", "TOKEN NAME", |r: &ContractRow, _| {
            if r.is_token_added() {
                r.event
                    .name
                    .as_deref()
                    .unwrap_or("UNKNOWN")
                    .to_uppercase()
            } else {
                NA.to_string()
            }
        }),
        Column::new("tokenAddress", "TOKEN ADDRESS", |r: &ContractRow, _| {
            if r.is_token_added() {
                short_or_na(r.event.token.as_deref())
            } else {
                NA.to_string()
            }
        }),
        Column::new("tokenIn", "TOKEN IN", |r: &ContractRow, _| {
            short_or_na(r.event.token_in.as_deref())
        }),
        Column::new("tokenOut", "TOKEN OUT", |r: &ContractRow, _| {
            short_or_na(r.event.token_out.as_deref())
        }),
        Column::new("amountIn", "AMOUNT IN", |r: &ContractRow, _| {
            fixed(parse_num(r.event.amount_in.as_deref()), 6)
        })
        .sortable(|r| SortKey::Num(parse_num(r.event.amount_in.as_deref()))),
        Column::new("amountOut", "AMOUNT OUT", |r: &ContractRow, _| {
            fixed(parse_num(r.event.amount_out.as_deref()), 6)
        })
        .sortable(|r| SortKey::Num(parse_num(r.event.amount_out.as_deref()))),
        Column::new("txHash", "TRANSACTION", |r: &ContractRow, _| {
            short_address(&r.event.tx_hash)
        }),
        Column::new("timestamp", "TIME", |r: &ContractRow, _| r.time.clone())
            .sortable(|r| SortKey::Num(r.event.timestamp.map(|t| t as f64))),
    ])
}
