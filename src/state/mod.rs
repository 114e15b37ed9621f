pub mod countries;
mod session;
mod settings;
mod status;

pub use session::Session;
pub use settings::{SelectedCountry, Settings, SettingsError, SettingsStore, SortSpec};
pub use status::{StatusHub, TransactionStatus};
