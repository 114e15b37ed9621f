//! State of the `watch` view and how events change it.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::api::accuracy::AccuracyStats;
use crate::events::Event;
use crate::present::{
    accuracy_line, clock_line, contract_table, signal_table, summary_line, ContractRow, Countdown,
    FETCH_FAILED,
};
use crate::signals::{prepare, SignalRow, SignalSummary, TokenDirectory};
use crate::state::SortSpec;

/// What the event loop should do after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Countdown hit zero; spawn a signal fetch
    Refetch,
    Quit,
}

pub struct Dashboard {
    tokens: TokenDirectory,
    zone: Tz,
    country: String,
    search: String,
    sorting: Vec<SortSpec>,
    countdown: Countdown,
    rows: Vec<SignalRow>,
    contract: Vec<ContractRow>,
    accuracy: Option<AccuracyStats>,
    banner: Option<&'static str>,
    loading: bool,
}

impl Dashboard {
    pub fn new(
        tokens: TokenDirectory,
        zone: Tz,
        country: impl Into<String>,
        search: impl Into<String>,
        sorting: Vec<SortSpec>,
        refresh_secs: u64,
    ) -> Self {
        let sorting = signal_table().valid_sorting(&sorting);
        Self {
            tokens,
            zone,
            country: country.into(),
            search: search.into(),
            sorting,
            countdown: Countdown::new(refresh_secs),
            rows: Vec::new(),
            contract: Vec::new(),
            accuracy: None,
            banner: None,
            loading: true,
        }
    }

    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn banner(&self) -> Option<&'static str> {
        self.banner
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn apply(&mut self, event: Event) -> Control {
        match event {
            Event::Signals(Ok(signals)) => {
                let mut rows = prepare(signals, &self.search, &self.tokens, self.zone);
                signal_table().sort(&mut rows, &self.sorting);
                self.rows = rows;
                self.banner = None;
                self.loading = false;
            }
            Event::Signals(Err(_)) => {
                self.rows.clear();
                self.banner = Some(FETCH_FAILED);
                self.loading = false;
            }
            Event::ContractStatus(Ok(events)) => {
                self.contract = ContractRow::from_events(events, self.zone);
            }
            Event::ContractStatus(Err(_)) => self.contract.clear(),
            Event::Accuracy(Ok(stats)) => self.accuracy = Some(stats),
            Event::Accuracy(Err(_)) => {}
            Event::Tick => {
                if self.countdown.tick() {
                    return Control::Refetch;
                }
            }
            Event::Shutdown => return Control::Quit,
        }
        Control::Continue
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        out.push_str(&clock_line(now, self.zone, &self.country));
        out.push('\n');
        out.push_str(&accuracy_line(self.accuracy.as_ref()));
        out.push('\n');

        let summary = SignalSummary::from_rows(&self.rows);
        out.push_str(&format!(
            "{}    {}\n\n",
            summary_line(&summary),
            self.countdown.display()
        ));

        match (self.banner, self.loading) {
            (Some(banner), _) => {
                out.push_str(banner);
                out.push('\n');
            }
            (None, true) => out.push_str("Loading signals...\n"),
            (None, false) => out.push_str(&signal_table().render(&self.rows, &self.sorting)),
        }

        out.push_str("\nContract status\n");
        out.push_str(&contract_table().render(&self.contract, &[]));
        out
    }
}
