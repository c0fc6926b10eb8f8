//! Error types for access-control list construction and evaluation.

/// Reasons a single rule string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRule {
    /// The rule is the empty string.
    #[error("rule is empty")]
    Empty,

    /// The rule does not start with `/`, so it can never name a method.
    #[error("rule must start with '/'")]
    NotAbsolute,

    /// The wildcard marker appears somewhere other than the last position.
    #[error("wildcard '*' is only allowed as the final character")]
    MisplacedWildcard,
}

/// Errors raised while building an [`AccessControlList`](crate::AccessControlList).
///
/// These are configuration errors: they surface at startup, never per call.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    /// The textual ACL is not a JSON object of string arrays.
    #[error("ACL parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entry has an empty identity key.
    #[error("ACL contains an empty consumer identity")]
    EmptyIdentity,

    /// One of an identity's rules is malformed.
    #[error("ACL rule {rule:?} for consumer {identity:?} is invalid: {reason}")]
    InvalidRule {
        identity: String,
        rule: String,
        #[source]
        reason: InvalidRule,
    },
}

/// Why a call was refused by the ACL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// The identity has no ACL entry at all.
    #[error("consumer not found: {0}")]
    UnknownIdentity(String),

    /// The identity exists but none of its rules match the method.
    #[error("consumer {consumer} is not allowed to call {method}")]
    MethodNotAllowed { consumer: String, method: String },
}
