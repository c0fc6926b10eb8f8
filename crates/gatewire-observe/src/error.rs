//! Error types for the broadcast layer.

use std::time::Duration;

/// Errors that can occur while delivering events or running a subscriber.
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    /// A statistics window was requested with a zero-length period.
    #[error("statistics interval must be positive")]
    InvalidInterval,

    /// The subscriber's external output stream went away.
    #[error("subscriber output stream closed")]
    OutputClosed,

    /// The subscriber in `slot` released its channel while a delivery was pending.
    #[error("subscriber in slot {slot} closed its channel")]
    SubscriberClosed { slot: usize },

    /// The subscriber in `slot` did not accept a delivery within the configured timeout.
    #[error("subscriber in slot {slot} stalled for {timeout:?}")]
    DeliveryTimedOut { slot: usize, timeout: Duration },
}
