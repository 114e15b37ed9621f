use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;

use crate::wallet::FlowStage;

/// Outcome of the most recent buy/sell, shared for the rest of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionStatus {
    /// Quote-token price of one asset unit right after the buy
    pub price_bought: Decimal,
    /// Contract deposit balance, ether-formatted
    pub user_balance: String,
    pub tx_hash: String,
    pub token_name: String,
    pub token_address: String,
    /// Where the running (or last) flow is
    pub stage: FlowStage,
}

/// Single writer, many readers. Writes come from one user-triggered flow
/// at a time, so there is no write coordination beyond the channel.
#[derive(Debug, Clone)]
pub struct StatusHub {
    tx: Arc<watch::Sender<TransactionStatus>>,
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TransactionStatus::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionStatus> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TransactionStatus {
        self.tx.borrow().clone()
    }

    pub fn set_price_bought(&self, price: Decimal) {
        self.tx.send_modify(|s| s.price_bought = price);
    }

    pub fn set_user_balance(&self, balance: impl Into<String>) {
        let balance = balance.into();
        self.tx.send_modify(|s| s.user_balance = balance);
    }

    pub fn set_tx_hash(&self, hash: impl Into<String>) {
        let hash = hash.into();
        self.tx.send_modify(|s| s.tx_hash = hash);
    }

    pub fn set_token_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.tx.send_modify(|s| s.token_name = name);
    }

    pub fn set_stage(&self, stage: FlowStage) {
        self.tx.send_if_modified(|s| {
            let changed = s.stage != stage;
            s.stage = stage;
            changed
        });
    }

    pub fn set_token_address(&self, address: impl Into<String>) {
        let address = address.into();
        self.tx.send_modify(|s| s.token_address = address);
    }
}
