use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::Event;

/// Spawns a task that sends `Tick` once per second
pub fn spawn(tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    spawn_every(Duration::from_secs(1), tx)
}

fn spawn_every(period: Duration, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(Event::Tick).await.is_err() {
                break;
            }
        }
    })
}

/// Sends `Shutdown` on Ctrl+C.
pub fn spawn_shutdown(tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl+c received");
                let _ = tx.send(Event::Shutdown).await;
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl+c"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_until_closed() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = spawn_every(Duration::from_millis(5), tx);
        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(Event::Tick)));
        }
        drop(rx);
        handle.await.unwrap();
    }
}
