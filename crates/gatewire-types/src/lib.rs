//! Shared types and constants for the gatewire workspace.
//!
//! This crate holds the records that cross crate boundaries: the [`Event`]
//! produced for every admitted call, the per-window [`StatSnapshot`], and the
//! small request messages exchanged by the RPC surface. It deliberately has
//! no runtime dependencies beyond `serde`.

use serde::{Deserialize, Serialize};

mod event;
mod stats;

pub use event::Event;
pub use stats::StatSnapshot;

/// Metadata key that carries the caller's logical identity.
pub const CONSUMER_METADATA_KEY: &str = "consumer";

/// Wildcard marker that turns an ACL rule into a prefix pattern.
pub const WILDCARD: char = '*';

/// Fully qualified method names served by the RPC surface.
pub mod methods {
    /// Unary echo: `Biz.Check`.
    pub const BIZ_CHECK: &str = "/main.Biz/Check";
    /// Unary echo: `Biz.Add`.
    pub const BIZ_ADD: &str = "/main.Biz/Add";
    /// Unary echo: `Biz.Test`.
    pub const BIZ_TEST: &str = "/main.Biz/Test";
    /// Server stream of every admitted call.
    pub const ADMIN_LOGGING: &str = "/main.Admin/Logging";
    /// Server stream of periodic call statistics.
    pub const ADMIN_STATISTICS: &str = "/main.Admin/Statistics";
}

/// Empty request/response message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nothing {
    #[serde(default)]
    pub dummy: bool,
}

/// Request body for the statistics stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatInterval {
    /// Aggregation window length in whole seconds. Must be positive.
    pub interval_seconds: u64,
}
