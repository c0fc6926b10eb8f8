//! Event fan-out and streaming subscribers for admitted calls.
//!
//! Every call that passes admission produces one [`Event`](gatewire_types::Event).
//! The [`Broadcaster`] copies it onto the channel of every subscriber that
//! currently holds a slot in the [`SubscriberRegistry`]. Two subscriber kinds
//! consume those channels:
//!
//! | Subscriber | Output |
//! |------------|--------|
//! | [`LogTail`] | every event, in publish order |
//! | [`StatsAggregator`] | one [`StatSnapshot`](gatewire_types::StatSnapshot) per tick, counts reset each window |
//!
//! Both run until their [`StreamLifetime`] is cancelled and always hand their
//! slot back on exit.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gatewire_observe::{Broadcaster, LogTail, StreamLifetime};
//!
//! let broadcaster = Broadcaster::default();
//! let tail = LogTail::acquire(&broadcaster).await;
//! let (tx, mut rx) = tokio::sync::mpsc::channel(16);
//! tokio::spawn(tail.run(tx, StreamLifetime::new(service_token, call_token)));
//!
//! broadcaster.publish(event).await;
//! let seen = rx.recv().await;
//! ```

mod broadcast;
mod error;
mod lifetime;
mod log_tail;
mod registry;
mod statistics;

pub use broadcast::{BroadcastConfig, Broadcaster};
pub use error::ObserveError;
pub use lifetime::StreamLifetime;
pub use log_tail::LogTail;
pub use registry::{SubscriberRegistry, Subscription};
pub use statistics::{StatsAggregator, MAX_PERIOD};
