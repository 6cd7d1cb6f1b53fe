use super::publisher::EventSubscription;
use crate::core::{BookError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Background task that drains the event channels and logs every event.
///
/// Runs independently of request handling; a slow consumer only lags its own
/// receivers.
pub struct EventConsumer {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
    processed: Arc<AtomicU64>,
}

impl EventConsumer {
    pub fn spawn(mut subscription: EventSubscription) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let processed = Arc::new(AtomicU64::new(0));
        let processed_for_worker = processed.clone();

        let join_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        break;
                    }
                    received = subscription.recv() => match received {
                        Ok(event) => {
                            processed_for_worker.fetch_add(1, Ordering::Relaxed);
                            info!(
                                event_id = %event.id,
                                kind = %event.kind,
                                key = %event.partition_key(),
                                data = %event.data,
                                "Received event"
                            );
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "event consumer lagged behind");
                        }
                        Err(RecvError::Closed) => {
                            debug!("event channels closed");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
            processed,
        }
    }

    /// Events handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Signals the consumer to stop and waits for it to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle
                .await
                .map_err(|err| BookError::Internal(format!("event consumer join: {}", err)))?;
        }
        Ok(())
    }
}

impl Drop for EventConsumer {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}
