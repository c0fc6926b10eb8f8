//! Subscriber that counts events per window and flushes on a fixed tick.

use std::time::Duration;

use gatewire_types::StatSnapshot;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::broadcast::Broadcaster;
use crate::error::ObserveError;
use crate::lifetime::StreamLifetime;
use crate::registry::Subscription;

/// Longest flush period actually scheduled, about a century. Longer requests
/// are clamped so the tick deadline stays representable.
pub const MAX_PERIOD: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A statistics stream that has acquired its slot and is ready to run.
#[derive(Debug)]
pub struct StatsAggregator {
    subscription: Subscription,
    period: Duration,
}

impl StatsAggregator {
    /// Acquires a slot for a stream that flushes every `period`.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::InvalidInterval`] for a zero period, before
    /// any slot is taken. Periods above [`MAX_PERIOD`] are clamped to it.
    pub async fn acquire(broadcaster: &Broadcaster, period: Duration) -> Result<Self, ObserveError> {
        if period.is_zero() {
            return Err(ObserveError::InvalidInterval);
        }
        Ok(Self {
            subscription: broadcaster.subscribe().await,
            period: period.min(MAX_PERIOD),
        })
    }

    pub fn slot(&self) -> usize {
        self.subscription.slot()
    }

    /// The flush period in effect, after clamping.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Accumulates events and sends one [`StatSnapshot`] to `output` per
    /// tick until `lifetime` is cancelled, then releases the slot.
    ///
    /// Each flush swaps in a fresh snapshot, so windows never share counts.
    /// A window without events is still emitted, with empty maps. The
    /// partial window in progress at cancellation is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::OutputClosed`] if `output` is dropped by the
    /// reader. The slot is released on every exit path.
    pub async fn run(
        self,
        output: mpsc::Sender<StatSnapshot>,
        lifetime: StreamLifetime,
    ) -> Result<(), ObserveError> {
        let Self {
            mut subscription,
            period,
        } = self;
        let slot = subscription.slot();
        tracing::info!(slot, interval_secs = period.as_secs(), "statistics stream started");

        let now = Instant::now();
        let first_tick = now.checked_add(period).unwrap_or(now + MAX_PERIOD);
        let mut ticker = interval_at(first_tick, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut window = StatSnapshot::new(unix_now());

        let result = loop {
            tokio::select! {
                biased;
                () = lifetime.cancelled() => break Ok(()),
                _ = ticker.tick() => {
                    let flushed = std::mem::replace(&mut window, StatSnapshot::new(unix_now()));
                    tokio::select! {
                        biased;
                        () = lifetime.cancelled() => break Ok(()),
                        sent = output.send(flushed) => {
                            if sent.is_err() {
                                break Err(ObserveError::OutputClosed);
                            }
                        }
                    }
                }
                next = subscription.recv() => match next {
                    Some(event) => window.record(&event),
                    None => break Ok(()),
                },
            }
        };

        subscription.release().await;
        tracing::info!(slot, "statistics stream stopped");
        result
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
