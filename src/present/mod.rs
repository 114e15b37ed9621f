//! Plain-text rendering for the dashboard views.

pub mod columns;
mod countdown;
mod table;

pub use columns::{contract_table, signal_table, ContractRow};
pub use countdown::{clock_line, format_mmss, Countdown};
pub use table::{serial_column, Column, SortKey, Table};

use crate::api::accuracy::AccuracyStats;
use crate::signals::SignalSummary;

/// Banner shown instead of the table when the signal fetch fails.
pub const FETCH_FAILED: &str = "Failed to fetch signals. Please check your connection.";

/// Line above the signal table: buy ratio and validity window.
pub fn summary_line(summary: &SignalSummary) -> String {
    match &summary.valid_until {
        Some(until) => format!("{}  (valid until {until})", summary.buy_ratio()),
        None => summary.buy_ratio(),
    }
}

pub fn accuracy_line(stats: Option<&AccuracyStats>) -> String {
    match stats {
        Some(s) => s.line(),
        None => "Accuracy: loading...".to_string(),
    }
}
