//! Signal table pipeline: fetch → normalize → arrange.

mod model;
pub mod normalize;
pub mod sort;
pub mod time;
mod tokens;

pub(crate) use model::lenient;
pub use model::{HitStatus, Signal, SignalKind};
pub use normalize::{normalize, short_address, SignalRow, NOT_REACHED};
pub use sort::{arrange, filter_visible, sort_by_priority, Ranked, SignalSummary};
pub use tokens::TokenDirectory;

use chrono_tz::Tz;

/// Full pipeline over one fetched batch.
pub fn prepare(signals: Vec<Signal>, search: &str, tokens: &TokenDirectory, zone: Tz) -> Vec<SignalRow> {
    normalize(arrange(signals, search), tokens, zone)
}
