use std::cmp::Ordering;

use super::model::{Signal, SignalKind};
use super::normalize::SignalRow;

/// Anything that can be ordered and searched like a signal.
pub trait Ranked {
    fn kind(&self) -> &SignalKind;
    fn pair_name(&self) -> &str;
}

impl Ranked for Signal {
    fn kind(&self) -> &SignalKind {
        &self.signal
    }

    fn pair_name(&self) -> &str {
        &self.pair_name
    }
}

impl Ranked for SignalRow {
    fn kind(&self) -> &SignalKind {
        &self.signal.signal
    }

    fn pair_name(&self) -> &str {
        &self.signal.pair_name
    }
}

/// Pair names compare case-insensitively first so `bnb` sits next to `BNB`.
fn compare_pairs(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort: Buy, Hold, Sell, Error, then unknown kinds; ties by pair name.
pub fn sort_by_priority<T: Ranked>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.kind()
            .priority()
            .cmp(&b.kind().priority())
            .then_with(|| compare_pairs(a.pair_name(), b.pair_name()))
    });
}

/// Keep pairs containing `search` (trimmed, case-insensitive) and drop every Error row.
pub fn filter_visible<T: Ranked>(items: Vec<T>, search: &str) -> Vec<T> {
    let needle = search.trim().to_lowercase();
    items
        .into_iter()
        .filter(|item| needle.is_empty() || item.pair_name().to_lowercase().contains(&needle))
        .filter(|item| !item.kind().is_error())
        .collect()
}

/// Sort, then filter. This is the order the table shows before any column sort.
pub fn arrange<T: Ranked>(mut items: Vec<T>, search: &str) -> Vec<T> {
    sort_by_priority(&mut items);
    filter_visible(items, search)
}

/// Counters shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSummary {
    pub buys: usize,
    pub total: usize,
    /// Expiry of the first visible row, already localized
    pub valid_until: Option<String>,
}

impl SignalSummary {
    pub fn from_rows(rows: &[SignalRow]) -> Self {
        Self {
            buys: rows
                .iter()
                .filter(|r| matches!(r.signal.signal, SignalKind::Buy))
                .count(),
            total: rows.len(),
            valid_until: rows.first().map(|r| r.expires_at.clone()),
        }
    }

    pub fn buy_ratio(&self) -> String {
        format!("Buy: {}/{}", self.buys, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(pair: &str, kind: &str) -> Signal {
        Signal {
            pair_name: pair.to_string(),
            signal: SignalKind::from(kind),
            ..Default::default()
        }
    }

    fn mixed() -> Vec<Signal> {
        vec![
            sig("XVS/USDT", "Sell"),
            sig("CAKE/USDT", "Error"),
            sig("BTCB/USDT", "Hold"),
            sig("ZIL/USDT", "Buy"),
            sig("ADA/USDT", "Neutral"),
            sig("ETH/USDT", "Buy"),
            sig("DOGE/USDT", "Sell"),
            sig("bnb/USDT", "Hold"),
        ]
    }

    fn pairs(items: &[Signal]) -> Vec<&str> {
        items.iter().map(|s| s.pair_name.as_str()).collect()
    }

    #[test]
    fn test_priority_then_name() {
        let mut items = mixed();
        sort_by_priority(&mut items);
        assert_eq!(
            pairs(&items),
            vec![
                "ETH/USDT", "ZIL/USDT", "bnb/USDT", "BTCB/USDT", "DOGE/USDT", "XVS/USDT",
                "CAKE/USDT", "ADA/USDT",
            ]
        );
    }

    #[test]
    fn test_buy_hold_sell_order_holds_after_arrange() {
        let items = arrange(mixed(), "");
        let ranks: Vec<u8> = items.iter().map(|s| s.signal.priority()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
        assert!(items.iter().all(|s| !s.signal.is_error()));
    }

    #[test]
    fn test_error_rows_always_dropped() {
        let items = arrange(mixed(), "cake");
        assert!(items.is_empty());
    }

    #[test]
    fn test_search_is_subset_and_case_insensitive() {
        let all = arrange(mixed(), "");
        for term in ["b", "USDT", "  eth ", "Do", "zzz"] {
            let hits = arrange(mixed(), term);
            let needle = term.trim().to_lowercase();
            for hit in &hits {
                assert!(hit.pair_name.to_lowercase().contains(&needle));
                assert!(all.iter().any(|s| s.pair_name == hit.pair_name));
            }
        }
        assert_eq!(pairs(&arrange(mixed(), "BNB")), vec!["bnb/USDT"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut a = sig("ETH/USDT", "Buy");
        a.current_price = Some("1".to_string());
        let mut b = sig("ETH/USDT", "Buy");
        b.current_price = Some("2".to_string());

        let mut items = vec![a, b];
        sort_by_priority(&mut items);
        assert_eq!(items[0].current_price.as_deref(), Some("1"));
        assert_eq!(items[1].current_price.as_deref(), Some("2"));
    }

    #[test]
    fn test_summary() {
        use crate::signals::{normalize, TokenDirectory};
        let rows = normalize(arrange(mixed(), ""), &TokenDirectory::builtin(), chrono_tz::Tz::UTC);
        let summary = SignalSummary::from_rows(&rows);
        assert_eq!(summary.buy_ratio(), "Buy: 2/7");
        assert_eq!(summary.valid_until.as_deref(), Some("N/A"));

        let empty = SignalSummary::from_rows(&[]);
        assert_eq!(empty.buy_ratio(), "Buy: 0/0");
        assert!(empty.valid_until.is_none());
    }
}
