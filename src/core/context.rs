//! Per-request execution context.
//!
//! Every suspension point of a catalogue operation (store, cache and publish
//! calls) runs through [`RequestContext::run`], so an expired deadline or a
//! tripped cancellation abandons the call instead of letting it hang.

use super::error::{BookError, Result};
use std::future::{Future, pending};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancelled: Option<watch::Receiver<bool>>,
}

/// Trips the cancellation signal of every context cloned from its pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// Context without deadline or cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: None,
        }
    }

    /// Applies an optional timeout; `None` leaves the context unbounded.
    pub fn with_optional_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::with_timeout).unwrap_or_default()
    }

    /// Attaches a cancellation signal, keeping the deadline.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancelled = Some(rx);
        (self, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|rx| *rx.borrow())
    }

    /// Fails fast when the context is already done.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(BookError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(BookError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drives `fut` until it completes, the deadline passes, or the context is
    /// cancelled, whichever happens first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.check()?;
        let cancelled = wait_cancelled(self.cancelled.clone());
        let expired = wait_deadline(self.deadline);

        tokio::select! {
            biased;
            _ = cancelled => Err(BookError::Cancelled),
            _ = expired => Err(BookError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

async fn wait_cancelled(rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = rx else {
        return pending().await;
    };
    let outcome = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
    if outcome.is_err() {
        // Handle dropped without cancelling.
        pending::<()>().await;
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}
