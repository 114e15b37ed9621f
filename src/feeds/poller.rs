use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiError};
use crate::events::Event;

/// Spawns a task that calls `fetch` every `every` and forwards the result.
/// The first fetch runs immediately. Stops once the receiver is gone.
pub fn spawn_poller<T, F, Fut>(
    name: &'static str,
    every: Duration,
    tx: mpsc::Sender<Event>,
    fetch: F,
    wrap: fn(Result<T, ApiError>) -> Event,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let result = fetch().await;
            if let Err(e) = &result {
                tracing::warn!(feed = name, error = %e, "poll failed");
            }
            if tx.send(wrap(result)).await.is_err() {
                tracing::debug!(feed = name, "receiver dropped, stopping");
                break;
            }
        }
    })
}

pub fn spawn_contract_status(client: ApiClient, every: Duration, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    spawn_poller(
        "contract_status",
        every,
        tx,
        move || {
            let client = client.clone();
            async move { client.fetch_contract_status().await }
        },
        Event::ContractStatus,
    )
}

pub fn spawn_accuracy(client: ApiClient, every: Duration, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    spawn_poller(
        "accuracy",
        every,
        tx,
        move || {
            let client = client.clone();
            async move { client.fetch_accuracy().await }
        },
        Event::Accuracy,
    )
}

/// One signal fetch; the countdown decides when the next one happens.
pub fn fetch_signals_once(client: ApiClient, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = client.fetch_signals().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "signal fetch failed");
        }
        let _ = tx.send(Event::Signals(result)).await;
    })
}
