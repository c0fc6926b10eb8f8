//! Subscriber that relays every event, unfiltered, to one output stream.

use std::sync::Arc;

use gatewire_types::Event;
use tokio::sync::mpsc;

use crate::broadcast::Broadcaster;
use crate::error::ObserveError;
use crate::lifetime::StreamLifetime;
use crate::registry::Subscription;

/// A log-tail stream that has acquired its slot and is ready to run.
#[derive(Debug)]
pub struct LogTail {
    subscription: Subscription,
}

impl LogTail {
    /// Acquires a slot. Events published from this point on are delivered.
    pub async fn acquire(broadcaster: &Broadcaster) -> Self {
        Self {
            subscription: broadcaster.subscribe().await,
        }
    }

    pub fn slot(&self) -> usize {
        self.subscription.slot()
    }

    /// Forwards events to `output` in arrival order until `lifetime` is
    /// cancelled, then releases the slot.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::OutputClosed`] if `output` is dropped by the
    /// reader. The slot is released on every exit path.
    pub async fn run(
        self,
        output: mpsc::Sender<Arc<Event>>,
        lifetime: StreamLifetime,
    ) -> Result<(), ObserveError> {
        let mut subscription = self.subscription;
        let slot = subscription.slot();
        tracing::info!(slot, "log-tail stream started");

        let result = loop {
            tokio::select! {
                biased;
                () = lifetime.cancelled() => break Ok(()),
                next = subscription.recv() => {
                    let Some(event) = next else { break Ok(()) };
                    tokio::select! {
                        biased;
                        () = lifetime.cancelled() => break Ok(()),
                        sent = output.send(event) => {
                            if sent.is_err() {
                                break Err(ObserveError::OutputClosed);
                            }
                        }
                    }
                }
            }
        };

        subscription.release().await;
        tracing::info!(slot, "log-tail stream stopped");
        result
    }
}
