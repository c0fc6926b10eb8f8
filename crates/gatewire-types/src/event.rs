//! The record emitted for every admitted call.

use serde::{Deserialize, Serialize};

/// One authorized call: who made it, what it invoked, when, and from where.
///
/// Events are built once by the admission interceptor and then shared
/// read-only (behind an `Arc`) with every active subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The caller's logical identity.
    pub consumer: String,
    /// Fully qualified method name, e.g. `/main.Biz/Check`.
    pub method: String,
    /// Wall-clock time of admission, in unix seconds.
    pub timestamp: i64,
    /// The caller's network address, or empty when the transport did not
    /// report one.
    pub host: String,
}

impl Event {
    pub fn new(
        consumer: impl Into<String>,
        method: impl Into<String>,
        timestamp: i64,
        host: impl Into<String>,
    ) -> Self {
        Self {
            consumer: consumer.into(),
            method: method.into(),
            timestamp,
            host: host.into(),
        }
    }
}
