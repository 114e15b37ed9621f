pub mod clock;
pub mod poller;

pub use poller::{fetch_signals_once, spawn_accuracy, spawn_contract_status, spawn_poller};
