//! Subscriber slot pool.
//!
//! Every live streaming consumer owns one slot: an index into a vector of
//! `(sender, active)` pairs guarded by a single async mutex. Acquiring reuses
//! the first inactive slot before growing the vector, and releasing never
//! shrinks it, so slot indices stay stable for the lifetime of the registry.

use std::sync::Arc;

use gatewire_types::Event;
use tokio::sync::{mpsc, Mutex, MutexGuard};

/// One entry in the slot vector.
///
/// Invariant: `sender` is `Some` if and only if `active` is `true`.
#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub(crate) sender: Option<mpsc::Sender<Arc<Event>>>,
    pub(crate) active: bool,
}

impl Slot {
    fn occupied(sender: mpsc::Sender<Arc<Event>>) -> Self {
        Self {
            sender: Some(sender),
            active: true,
        }
    }

    /// Returns the sender if this slot currently takes deliveries.
    pub(crate) fn live_sender(&self) -> Option<&mpsc::Sender<Arc<Event>>> {
        if self.active {
            self.sender.as_ref()
        } else {
            None
        }
    }
}

/// Pool of per-subscriber channels with acquire/release and slot reuse.
///
/// All mutation and enumeration of slots goes through one exclusive lock.
/// The [`Broadcaster`](crate::Broadcaster) holds that same lock for a whole
/// fan-out, so a subscriber is either fully present for a publish or fully
/// absent.
#[derive(Debug)]
pub struct SubscriberRegistry {
    slots: Mutex<Vec<Slot>>,
    channel_capacity: usize,
}

impl SubscriberRegistry {
    /// Creates an empty registry whose slot channels buffer up to
    /// `channel_capacity` events (clamped to at least one).
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Claims a slot and returns its receiving end together with its index.
    ///
    /// The first inactive slot is reused with a fresh channel; a new slot is
    /// appended only when every existing one is active.
    pub async fn acquire(&self) -> (mpsc::Receiver<Arc<Event>>, usize) {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let mut slots = self.slots.lock().await;
        let index = match slots.iter().position(|slot| !slot.active) {
            Some(free) => {
                slots[free] = Slot::occupied(tx);
                free
            }
            None => {
                slots.push(Slot::occupied(tx));
                slots.len() - 1
            }
        };
        tracing::debug!(slot = index, pool = slots.len(), "subscriber slot acquired");
        (rx, index)
    }

    /// Marks `index` inactive and drops its sender.
    ///
    /// Releasing a slot that is already free, or that never existed, is a
    /// no-op.
    pub async fn release(&self, index: usize) {
        let mut slots = self.slots.lock().await;
        match slots.get_mut(index) {
            Some(slot) if slot.active => {
                *slot = Slot::default();
                tracing::debug!(slot = index, "subscriber slot released");
            }
            _ => {
                tracing::warn!(slot = index, "release of a slot that is not active");
            }
        }
    }

    /// Number of slots currently held by a subscriber.
    pub async fn active_count(&self) -> usize {
        self.slots.lock().await.iter().filter(|slot| slot.active).count()
    }

    /// Total number of slots ever allocated, active or free.
    pub async fn pool_size(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub(crate) async fn lock_slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().await
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(1)
    }
}

/// A held slot: the receiving end of one subscriber channel.
///
/// Call [`Subscription::release`] when done. Dropping an unreleased
/// subscription closes the channel immediately and schedules the release on
/// the current runtime.
#[derive(Debug)]
pub struct Subscription {
    receiver: Option<mpsc::Receiver<Arc<Event>>>,
    slot: usize,
    registry: Arc<SubscriberRegistry>,
    released: bool,
}

impl Subscription {
    /// Acquires a slot from `registry`.
    pub async fn acquire(registry: Arc<SubscriberRegistry>) -> Self {
        let (receiver, slot) = registry.acquire().await;
        Self {
            receiver: Some(receiver),
            slot,
            registry,
            released: false,
        }
    }

    /// Index of the held slot.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Waits for the next event. Returns `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Arc<Event>> {
        match self.receiver.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Gives the slot back to the registry.
    ///
    /// The receiver is dropped before the registry lock is taken. Any send a
    /// publisher has pending on this slot (while holding the lock) fails at
    /// that point and the publisher moves on.
    pub async fn release(mut self) {
        self.receiver.take();
        self.registry.release(self.slot).await;
        self.released = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.receiver.take();
        let registry = Arc::clone(&self.registry);
        let slot = self.slot;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { registry.release(slot).await });
            }
            Err(_) => {
                tracing::warn!(slot, "subscription dropped outside a runtime; slot leaked");
            }
        }
    }
}
