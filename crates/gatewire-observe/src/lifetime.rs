//! Cancellation scope for streaming subscribers.

use tokio_util::sync::CancellationToken;

/// The two independent cancellation sources a subscriber stream obeys: the
/// whole service and the individual streaming call. Either one firing ends
/// the stream.
#[derive(Debug, Clone)]
pub struct StreamLifetime {
    service: CancellationToken,
    call: CancellationToken,
}

impl StreamLifetime {
    pub fn new(service: CancellationToken, call: CancellationToken) -> Self {
        Self { service, call }
    }

    /// Resolves once either token is cancelled.
    pub async fn cancelled(&self) {
        tokio::select! {
            () = self.service.cancelled() => {}
            () = self.call.cancelled() => {}
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.service.is_cancelled() || self.call.is_cancelled()
    }
}
