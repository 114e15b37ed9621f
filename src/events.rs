use crate::api::accuracy::AccuracyStats;
use crate::api::contract_status::ContractEvent;
use crate::api::ApiError;
use crate::signals::Signal;

/// Everything the dashboard loop reacts to. Producers are the spawned
/// feeds; the loop is the single consumer.
#[derive(Debug)]
pub enum Event {
    // Result of a one-shot signal fetch
    Signals(Result<Vec<Signal>, ApiError>),

    // Contract status poll
    ContractStatus(Result<Vec<ContractEvent>, ApiError>),

    // Accuracy poll
    Accuracy(Result<AccuracyStats, ApiError>),

    // Clock tick (every second)
    Tick,

    // Ctrl+C
    Shutdown,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Signals(_) => "signals",
            Event::ContractStatus(_) => "contract_status",
            Event::Accuracy(_) => "accuracy",
            Event::Tick => "tick",
            Event::Shutdown => "shutdown",
        }
    }
}
