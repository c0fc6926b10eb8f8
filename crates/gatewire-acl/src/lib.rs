//! Access-control list for consumer identities.
//!
//! An ACL maps each consumer identity to an ordered list of [`Rule`]s. A rule
//! is either an exact fully qualified method name (`/main.Biz/Check`) or a
//! prefix pattern ending in `*` (`/main.Biz/*`). The list is validated once
//! at construction and is read-only afterwards, so it can be shared between
//! request tasks without locking.
//!
//! # Usage
//!
//! ```rust
//! use gatewire_acl::AccessControlList;
//!
//! let acl = AccessControlList::from_json(r#"{"svc1": ["/pkg.Biz/*"]}"#).unwrap();
//! assert!(acl.authorize("svc1", "/pkg.Biz/Check").is_ok());
//! assert!(acl.authorize("svc1", "/pkg.Admin/Logging").is_err());
//! ```

mod error;
mod rule;

use std::collections::HashMap;

pub use error::{AccessDenied, AclError, InvalidRule};
pub use rule::Rule;

/// Validated, immutable consumer → rules mapping.
#[derive(Debug, Clone, Default)]
pub struct AccessControlList {
    entries: HashMap<String, Vec<Rule>>,
}

impl AccessControlList {
    /// Builds an ACL from already-parsed `(identity, rules)` pairs.
    ///
    /// Rule order is preserved per identity.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::EmptyIdentity`] for an empty identity key and
    /// [`AclError::InvalidRule`] for the first malformed rule encountered.
    pub fn new<I, R>(entries: I) -> Result<Self, AclError>
    where
        I: IntoIterator<Item = (String, R)>,
        R: IntoIterator<Item = String>,
    {
        let mut parsed = HashMap::new();
        for (identity, raw_rules) in entries {
            if identity.is_empty() {
                return Err(AclError::EmptyIdentity);
            }
            let mut rules = Vec::new();
            for raw in raw_rules {
                let rule = Rule::parse(&raw).map_err(|reason| AclError::InvalidRule {
                    identity: identity.clone(),
                    rule: raw.clone(),
                    reason,
                })?;
                rules.push(rule);
            }
            parsed.insert(identity, rules);
        }
        Ok(Self { entries: parsed })
    }

    /// Parses the textual form `{"identity": ["rule", ...], ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Parse`] if the text is not a JSON object of string
    /// arrays, or any validation error from [`AccessControlList::new`].
    pub fn from_json(text: &str) -> Result<Self, AclError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(text)?;
        Self::new(raw)
    }

    /// Returns the rules granted to `identity`, if it has an entry.
    pub fn rules(&self, identity: &str) -> Option<&[Rule]> {
        self.entries.get(identity).map(Vec::as_slice)
    }

    /// Checks whether `identity` may call `method`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::UnknownIdentity`] when the identity has no
    /// entry and [`AccessDenied::MethodNotAllowed`] when none of its rules
    /// match.
    pub fn authorize(&self, identity: &str, method: &str) -> Result<(), AccessDenied> {
        let rules = self
            .rules(identity)
            .ok_or_else(|| AccessDenied::UnknownIdentity(identity.to_string()))?;
        if rules.iter().any(|rule| rule.matches(method)) {
            Ok(())
        } else {
            Err(AccessDenied::MethodNotAllowed {
                consumer: identity.to_string(),
                method: method.to_string(),
            })
        }
    }

    /// Number of identities with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no identity has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the known identities in arbitrary order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACL_JSON: &str = r#"{
        "logger": ["/main.Admin/Logging"],
        "stat": ["/main.Admin/Statistics"],
        "biz_user": ["/main.Biz/Check", "/main.Biz/Add"],
        "biz_admin": ["/main.Biz/*"]
    }"#;

    #[test]
    fn from_json_loads_every_identity() {
        let acl = AccessControlList::from_json(ACL_JSON).unwrap();
        assert_eq!(acl.len(), 4);
        assert!(!acl.is_empty());
        let mut ids: Vec<_> = acl.identities().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["biz_admin", "biz_user", "logger", "stat"]);
    }

    #[test]
    fn rules_keep_declaration_order() {
        let acl = AccessControlList::from_json(ACL_JSON).unwrap();
        let rules = acl.rules("biz_user").unwrap();
        assert_eq!(
            rules,
            [
                Rule::Exact("/main.Biz/Check".to_string()),
                Rule::Exact("/main.Biz/Add".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_identity_is_denied_for_every_method() {
        let acl = AccessControlList::from_json(ACL_JSON).unwrap();
        for method in [
            "/main.Biz/Check",
            "/main.Biz/Add",
            "/main.Admin/Logging",
            "/does.Not/Exist",
        ] {
            assert_eq!(
                acl.authorize("stranger", method),
                Err(AccessDenied::UnknownIdentity("stranger".to_string()))
            );
        }
    }

    #[test]
    fn exact_rules_allow_only_listed_methods() {
        let acl = AccessControlList::from_json(ACL_JSON).unwrap();
        assert!(acl.authorize("biz_user", "/main.Biz/Check").is_ok());
        assert!(acl.authorize("biz_user", "/main.Biz/Add").is_ok());
        assert_eq!(
            acl.authorize("biz_user", "/main.Biz/Test"),
            Err(AccessDenied::MethodNotAllowed {
                consumer: "biz_user".to_string(),
                method: "/main.Biz/Test".to_string(),
            })
        );
    }

    #[test]
    fn wildcard_scenario() {
        let acl = AccessControlList::from_json(r#"{"svc1": ["/pkg.Biz/*"]}"#).unwrap();
        assert!(acl.authorize("svc1", "/pkg.Biz/Check").is_ok());
        assert!(acl.authorize("svc1", "/pkg.Biz/CheckMore").is_ok());
        assert!(matches!(
            acl.authorize("svc1", "/pkg.Admin/Logging"),
            Err(AccessDenied::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn bare_wildcard_grants_every_method() {
        let acl = AccessControlList::from_json(r#"{"root": ["*"]}"#).unwrap();
        for method in ["/main.Biz/Check", "/main.Admin/Logging", "/main.Admin/Statistics"] {
            assert!(acl.authorize("root", method).is_ok(), "{method}");
        }
    }

    #[test]
    fn identity_without_rules_is_known_but_denied() {
        let acl = AccessControlList::from_json(r#"{"mute": []}"#).unwrap();
        assert!(matches!(
            acl.authorize("mute", "/main.Biz/Check"),
            Err(AccessDenied::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            AccessControlList::from_json("{not json"),
            Err(AclError::Parse(_))
        ));
        assert!(matches!(
            AccessControlList::from_json(r#"{"svc": "/main.Biz/Check"}"#),
            Err(AclError::Parse(_))
        ));
    }

    #[test]
    fn invalid_rule_names_identity_and_rule() {
        let err = AccessControlList::from_json(r#"{"svc": ["/ok", ""]}"#).unwrap_err();
        match err {
            AclError::InvalidRule {
                identity,
                rule,
                reason,
            } => {
                assert_eq!(identity, "svc");
                assert_eq!(rule, "");
                assert_eq!(reason, InvalidRule::Empty);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_identity_is_rejected() {
        let err = AccessControlList::new([(String::new(), vec!["/main.Biz/*".to_string()])])
            .unwrap_err();
        assert!(matches!(err, AclError::EmptyIdentity));
    }
}
