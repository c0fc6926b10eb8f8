//! Per-window call counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Event;

/// Call counts accumulated over a single aggregation window.
///
/// A snapshot only ever describes its own window. At flush time the
/// aggregator replaces it with a fresh one instead of merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    /// Start of the window, in unix seconds.
    pub timestamp: i64,
    /// Calls per fully qualified method name.
    pub by_method: HashMap<String, u64>,
    /// Calls per consumer identity.
    pub by_consumer: HashMap<String, u64>,
}

impl StatSnapshot {
    /// Starts an empty window at `timestamp`.
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            by_method: HashMap::new(),
            by_consumer: HashMap::new(),
        }
    }

    /// Counts one event against this window.
    pub fn record(&mut self, event: &Event) {
        *self.by_method.entry(event.method.clone()).or_insert(0) += 1;
        *self.by_consumer.entry(event.consumer.clone()).or_insert(0) += 1;
    }

    /// Returns `true` if no event was recorded in this window.
    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty() && self.by_consumer.is_empty()
    }

    /// Total number of events recorded in this window.
    pub fn total(&self) -> u64 {
        self.by_method.values().sum()
    }
}
