use serde::{Deserialize, Deserializer};

use super::{ApiClient, ApiError};
use crate::signals::lenient;

/// Event emitted by the trading-bot contract, as indexed by the status backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractEvent {
    #[serde(rename = "type", default)]
    pub kind: EventKind,

    /// Token name, only set on `TokenAdded`
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub token: Option<String>,

    #[serde(rename = "tokenIn", default, deserialize_with = "lenient::opt_string")]
    pub token_in: Option<String>,

    #[serde(rename = "tokenOut", default, deserialize_with = "lenient::opt_string")]
    pub token_out: Option<String>,

    #[serde(rename = "amountIn", default, deserialize_with = "lenient::opt_string")]
    pub amount_in: Option<String>,

    #[serde(rename = "amountOut", default, deserialize_with = "lenient::opt_string")]
    pub amount_out: Option<String>,

    #[serde(rename = "txHash", default, deserialize_with = "lenient::string")]
    pub tx_hash: String,

    /// Epoch millis
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventKind {
    TokenAdded,
    Buy,
    Sell,
    Other(String),
    #[default]
    Unknown,
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TokenAdded => "TokenAdded",
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Other(s) => s,
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match lenient::opt_string(d)?.as_deref() {
            Some("TokenAdded") => Self::TokenAdded,
            Some("Buy") => Self::Buy,
            Some("Sell") => Self::Sell,
            Some("") | None => Self::Unknown,
            Some(other) => Self::Other(other.to_string()),
        })
    }
}

impl ApiClient {
    pub async fn fetch_contract_status(&self) -> Result<Vec<ContractEvent>, ApiError> {
        let url = self.endpoints().contract_status_url.clone();
        let events = self.get_list::<ContractEvent>(&url).await?;
        tracing::debug!(count = events.len(), "fetched contract status");
        Ok(events)
    }
}
