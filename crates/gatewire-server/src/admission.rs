//! Admission control for every inbound call.
//!
//! The [`Interceptor`] is transport-agnostic: it takes the identity, method
//! name, and peer address already pulled out of the call and either rejects
//! the call or records it. The axum adapter lives in
//! [`middleware`](crate::middleware).

use std::net::SocketAddr;
use std::sync::Arc;

use gatewire_acl::{AccessControlList, AccessDenied};
use gatewire_observe::Broadcaster;
use gatewire_types::Event;
use thiserror::Error;

/// The parts of an inbound call that admission looks at.
#[derive(Debug, Clone, Copy)]
pub struct CallInfo<'a> {
    /// Logical identity from call metadata, if any was sent.
    pub identity: Option<&'a str>,
    /// Fully qualified method name.
    pub method: &'a str,
    /// Peer address reported by the transport.
    pub source: Option<SocketAddr>,
}

/// Why a call was refused. Every variant is an authentication failure from
/// the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("consumer identity missing from call metadata")]
    MissingIdentity,

    #[error("consumer not found: {0}")]
    UnknownIdentity(String),

    #[error("consumer {consumer} is not allowed to call {method}")]
    MethodNotAllowed { consumer: String, method: String },
}

impl From<AccessDenied> for AdmissionError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::UnknownIdentity(consumer) => Self::UnknownIdentity(consumer),
            AccessDenied::MethodNotAllowed { consumer, method } => {
                Self::MethodNotAllowed { consumer, method }
            }
        }
    }
}

/// Checks calls against the ACL and publishes an [`Event`] for each one it
/// admits.
#[derive(Debug, Clone)]
pub struct Interceptor {
    acl: Arc<AccessControlList>,
    broadcaster: Broadcaster,
}

impl Interceptor {
    pub fn new(acl: Arc<AccessControlList>, broadcaster: Broadcaster) -> Self {
        Self { acl, broadcaster }
    }

    /// Evaluates the ACL and, on success, builds the event for this call.
    ///
    /// A missing peer address is recorded as an empty host.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError`] when the identity is missing, unknown, or
    /// has no rule matching the method.
    pub fn authorize(&self, call: &CallInfo<'_>) -> Result<Event, AdmissionError> {
        let consumer = call
            .identity
            .filter(|id| !id.is_empty())
            .ok_or(AdmissionError::MissingIdentity)?;
        self.acl.authorize(consumer, call.method)?;

        let host = call.source.map(|addr| addr.to_string()).unwrap_or_default();
        Ok(Event::new(
            consumer,
            call.method,
            chrono::Utc::now().timestamp(),
            host,
        ))
    }

    /// Authorizes the call and publishes its event before returning.
    ///
    /// Publishing blocks for as long as the slowest subscriber takes to
    /// accept the event. Denied calls publish nothing.
    ///
    /// # Errors
    ///
    /// Same as [`Interceptor::authorize`].
    pub async fn intercept(&self, call: &CallInfo<'_>) -> Result<(), AdmissionError> {
        let event = match self.authorize(call) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(method = call.method, "call denied: {}", err);
                return Err(err);
            }
        };
        let delivered = self.broadcaster.publish(event).await;
        tracing::trace!(method = call.method, delivered, "call admitted");
        Ok(())
    }
}
