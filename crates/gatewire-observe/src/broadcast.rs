//! Synchronous fan-out of admitted-call events.

use std::sync::Arc;
use std::time::Duration;

use gatewire_types::Event;
use tokio::sync::mpsc;

use crate::error::ObserveError;
use crate::registry::{SubscriberRegistry, Subscription};

/// Delivery settings shared by every slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber channel. `1` is a plain handoff.
    pub channel_capacity: usize,
    /// Upper bound on a single per-slot send. `None` blocks until the
    /// subscriber reads or releases its slot.
    pub send_timeout: Option<Duration>,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
            send_timeout: None,
        }
    }
}

/// Delivers each published event to every active subscriber slot.
///
/// Cheap to clone; clones share the same registry.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<SubscriberRegistry>,
    send_timeout: Option<Duration>,
}

impl Broadcaster {
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            registry: Arc::new(SubscriberRegistry::new(config.channel_capacity)),
            send_timeout: config.send_timeout,
        }
    }

    /// The underlying slot pool.
    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Claims a subscriber slot.
    pub async fn subscribe(&self) -> Subscription {
        Subscription::acquire(Arc::clone(&self.registry)).await
    }

    /// Hands `event` to every active slot and returns how many accepted it.
    ///
    /// The registry lock is held for the entire loop, so publishes are
    /// serialized against each other and against acquire/release. With no
    /// send timeout configured a stalled subscriber blocks this call until it
    /// reads or releases its slot. Failed deliveries are logged and skipped.
    pub async fn publish(&self, event: Event) -> usize {
        let event = Arc::new(event);
        let slots = self.registry.lock_slots().await;
        let mut delivered = 0;
        for (index, slot) in slots.iter().enumerate() {
            let Some(sender) = slot.live_sender() else {
                continue;
            };
            match self.deliver(index, sender, Arc::clone(&event)).await {
                Ok(()) => delivered += 1,
                Err(err @ ObserveError::DeliveryTimedOut { .. }) => {
                    tracing::warn!(slot = index, "dropped event for stalled subscriber: {}", err);
                }
                Err(err) => {
                    tracing::debug!(slot = index, "dropped event: {}", err);
                }
            }
        }
        delivered
    }

    async fn deliver(
        &self,
        slot: usize,
        sender: &mpsc::Sender<Arc<Event>>,
        event: Arc<Event>,
    ) -> Result<(), ObserveError> {
        match self.send_timeout {
            None => sender
                .send(event)
                .await
                .map_err(|_| ObserveError::SubscriberClosed { slot }),
            Some(timeout) => match tokio::time::timeout(timeout, sender.send(event)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(_)) => Err(ObserveError::SubscriberClosed { slot }),
                Err(_) => Err(ObserveError::DeliveryTimedOut { slot, timeout }),
            },
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(BroadcastConfig::default())
    }
}
