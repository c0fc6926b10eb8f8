//! Single permission rules and their matching semantics.

use std::fmt;
use std::str::FromStr;

use gatewire_types::WILDCARD;

use crate::error::InvalidRule;

/// One permission granted to a consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Matches exactly one fully qualified method name.
    Exact(String),
    /// Matches every method starting with the stored prefix (the wildcard
    /// marker already stripped).
    Prefix(String),
}

impl Rule {
    /// Parses a rule string.
    ///
    /// A trailing `*` makes the rule a prefix pattern; anything else must be
    /// an exact method path. A bare `*` is the empty prefix and matches every
    /// method.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRule`] for empty rules, non-empty patterns not
    /// starting with `/`, and rules with a `*` anywhere but the end.
    pub fn parse(raw: &str) -> Result<Self, InvalidRule> {
        if raw.is_empty() {
            return Err(InvalidRule::Empty);
        }
        let (pattern, is_prefix) = match raw.strip_suffix(WILDCARD) {
            Some(prefix) => (prefix, true),
            None => (raw, false),
        };
        if pattern.contains(WILDCARD) {
            return Err(InvalidRule::MisplacedWildcard);
        }
        if !pattern.is_empty() && !pattern.starts_with('/') {
            return Err(InvalidRule::NotAbsolute);
        }
        if is_prefix {
            Ok(Self::Prefix(pattern.to_string()))
        } else {
            Ok(Self::Exact(pattern.to_string()))
        }
    }

    /// Returns `true` if this rule grants access to `method`.
    pub fn matches(&self, method: &str) -> bool {
        match self {
            Self::Exact(name) => name == method,
            Self::Prefix(prefix) => method.starts_with(prefix.as_str()),
        }
    }
}

impl FromStr for Rule {
    type Err = InvalidRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Prefix(prefix) => write!(f, "{prefix}{WILDCARD}"),
        }
    }
}
