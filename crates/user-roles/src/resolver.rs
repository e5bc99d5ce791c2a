//! # Resolver
//!
//! Decides whether a permission map grants an action on a resource type.
//!
//! Two wildcard rules are supported, selected by [`WildcardMode`]:
//!
//! - **Fallback** (default): the explicit entry for the requested type wins;
//!   the `"*"` entry is consulted only when the type has no entry of its own.
//! - **FirstKey**: the map is in "any-type" mode when its first-inserted key
//!   is `"*"`. In that mode the requested type is ignored and only the `"*"`
//!   entry is evaluated. Otherwise the `"*"` key is treated like any other
//!   type name. This mirrors how role maps behaved when key order was
//!   significant, and is kept for compatibility.
//!
//! Both rules agree on maps that contain only `"*"` and on maps without a
//! `"*"` key. They disagree only when `"*"` is mixed with explicit types.
//!
//! ```text
//! map = { "*": "*", "users": ["view"] }
//!
//!   can("edit", "users")   Fallback -> false   FirstKey -> true
//!   can("edit", "pages")   Fallback -> true    FirstKey -> true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permissions::{PermissionMap, PermissionValue, WILDCARD};

/// How the `"*"` type key takes part in resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardMode {
    /// Explicit type entries first, then `"*"`. Key order is irrelevant.
    #[default]
    Fallback,
    /// Any-type mode iff `"*"` is the first-inserted key.
    ///
    /// Order is plain insertion order. Integer-like keys such as `"2"` are
    /// not moved ahead of `"*"`, unlike JavaScript `Object.keys`, so
    /// `{"*": "*", "2": [..]}` stays in any-type mode here.
    FirstKey,
}

impl WildcardMode {
    /// Get the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            WildcardMode::Fallback => "fallback",
            WildcardMode::FirstKey => "first_key",
        }
    }

    /// Parse mode from string representation.
    ///
    /// # Example
    ///
    /// ```
    /// use user_roles::WildcardMode;
    ///
    /// assert_eq!(WildcardMode::parse("fallback"), Some(WildcardMode::Fallback));
    /// assert_eq!(WildcardMode::parse("first-key"), Some(WildcardMode::FirstKey));
    /// assert_eq!(WildcardMode::parse("ordered"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Some(WildcardMode::Fallback),
            "first_key" | "first-key" | "firstkey" => Some(WildcardMode::FirstKey),
            _ => None,
        }
    }
}

impl fmt::Display for WildcardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which entry of the map a decision was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchedEntry {
    /// The entry keyed by the requested resource type.
    Type,
    /// The `"*"` entry.
    AnyType,
    /// No applicable entry; the request is denied.
    Missing,
}

/// The outcome of one evaluation, with the entry that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decision {
    /// Whether the action is granted.
    pub granted: bool,
    /// The entry that was evaluated.
    pub matched: MatchedEntry,
}

impl Decision {
    fn evaluate(value: &PermissionValue, action: &str, matched: MatchedEntry) -> Self {
        Self {
            granted: value.allows(action),
            matched,
        }
    }

    fn missing() -> Self {
        Self {
            granted: false,
            matched: MatchedEntry::Missing,
        }
    }
}

/// Permission resolver for a fixed [`WildcardMode`].
///
/// Stateless; evaluation never mutates the map and never fails.
///
/// # Example
///
/// ```
/// use user_roles::{PermissionMap, PermissionValue, Resolver, WildcardMode};
///
/// let map = PermissionMap::new()
///     .with("*", PermissionValue::Wildcard)
///     .with("users", PermissionValue::actions(["view"]));
///
/// assert!(!Resolver::new(WildcardMode::Fallback).can(&map, "edit", "users"));
/// assert!(Resolver::new(WildcardMode::FirstKey).can(&map, "edit", "users"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolver {
    mode: WildcardMode,
}

impl Resolver {
    /// Create a resolver for `mode`.
    pub fn new(mode: WildcardMode) -> Self {
        Self { mode }
    }

    /// The wildcard mode in use.
    pub fn mode(&self) -> WildcardMode {
        self.mode
    }

    /// Decide whether `permissions` grants `action` on `resource_type`.
    pub fn can(&self, permissions: &PermissionMap, action: &str, resource_type: &str) -> bool {
        self.explain(permissions, action, resource_type).granted
    }

    /// Like [`can`](Self::can), but also reports which entry decided.
    pub fn explain(&self, permissions: &PermissionMap, action: &str, resource_type: &str) -> Decision {
        match self.mode {
            WildcardMode::FirstKey => {
                if permissions.first_key() == Some(WILDCARD) {
                    return match permissions.any_type() {
                        Some(value) => Decision::evaluate(value, action, MatchedEntry::AnyType),
                        None => Decision::missing(),
                    };
                }
                match permissions.get(resource_type) {
                    Some(value) => Decision::evaluate(value, action, MatchedEntry::Type),
                    None => Decision::missing(),
                }
            }
            WildcardMode::Fallback => {
                if let Some(value) = permissions.get(resource_type) {
                    return Decision::evaluate(value, action, MatchedEntry::Type);
                }
                match permissions.any_type() {
                    Some(value) => Decision::evaluate(value, action, MatchedEntry::AnyType),
                    None => Decision::missing(),
                }
            }
        }
    }
}

/// Decide whether `permissions` grants `action` on `resource_type` using the
/// default [`WildcardMode`].
///
/// # Example
///
/// ```
/// use user_roles::{can, PermissionMap, PermissionValue};
///
/// let map = PermissionMap::new().with("*", PermissionValue::actions(["delete", "edit"]));
/// assert!(can(&map, "edit", "pages"));
/// assert!(!can(&map, "publish", "pages"));
/// ```
pub fn can(permissions: &PermissionMap, action: &str, resource_type: &str) -> bool {
    Resolver::default().can(permissions, action, resource_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [WildcardMode; 2] = [WildcardMode::Fallback, WildcardMode::FirstKey];

    fn map(entries: &[(&str, PermissionValue)]) -> PermissionMap {
        entries.iter().cloned().collect()
    }

    fn list(actions: &[&str]) -> PermissionValue {
        PermissionValue::actions(actions.iter().copied())
    }

    #[test]
    fn test_wildcard_action_for_explicit_type() {
        let perms = map(&[("users", list(&["edit", "view"])), ("pages", PermissionValue::Wildcard)]);
        for mode in MODES {
            assert!(Resolver::new(mode).can(&perms, "edit", "pages"), "{mode}");
            assert!(Resolver::new(mode).can(&perms, "view", "users"), "{mode}");
            assert!(!Resolver::new(mode).can(&perms, "delete", "users"), "{mode}");
        }
    }

    #[test]
    fn test_any_type_action_list() {
        let perms = map(&[("*", list(&["delete", "edit"]))]);
        for mode in MODES {
            assert!(Resolver::new(mode).can(&perms, "edit", "pages"), "{mode}");
            assert!(Resolver::new(mode).can(&perms, "delete", "users"), "{mode}");
        }
    }

    #[test]
    fn test_full_wildcard() {
        let perms = map(&[("*", PermissionValue::Wildcard)]);
        for mode in MODES {
            let resolver = Resolver::new(mode);
            for (action, ty) in [("edit", "pages"), ("delete", "users"), ("", ""), ("x", "*")] {
                assert!(resolver.can(&perms, action, ty), "{mode} {action} {ty}");
            }
        }
    }

    #[test]
    fn test_any_type_action_not_listed() {
        let perms = map(&[("*", list(&["modify", "arrange"]))]);
        for mode in MODES {
            assert!(!Resolver::new(mode).can(&perms, "organize", "users"), "{mode}");
        }
    }

    #[test]
    fn test_missing_type_denied() {
        let perms = map(&[("users", list(&["modify", "arrange"])), ("pages", list(&["delete", "edit"]))]);
        for mode in MODES {
            let resolver = Resolver::new(mode);
            assert!(!resolver.can(&perms, "modify", "posts"), "{mode}");
            assert!(resolver.can(&perms, "edit", "pages"), "{mode}");
            assert!(!resolver.can(&perms, "organize", "users"), "{mode}");
            assert_eq!(resolver.explain(&perms, "modify", "posts").matched, MatchedEntry::Missing);
        }
    }

    #[test]
    fn test_empty_map_denies() {
        let perms = PermissionMap::new();
        for mode in MODES {
            assert!(!Resolver::new(mode).can(&perms, "view", "users"));
        }
    }

    #[test]
    fn test_case_sensitive() {
        let perms = map(&[("users", list(&["edit"]))]);
        for mode in MODES {
            let resolver = Resolver::new(mode);
            assert!(!resolver.can(&perms, "Edit", "users"));
            assert!(!resolver.can(&perms, "edit", "Users"));
            assert!(!resolver.can(&perms, "edit ", "users"));
        }
    }

    #[test]
    fn test_first_key_mode_ignores_explicit_types() {
        let perms = map(&[("*", list(&["view"])), ("users", PermissionValue::Wildcard)]);
        let resolver = Resolver::new(WildcardMode::FirstKey);

        // "*" first: only the "*" entry counts
        assert!(!resolver.can(&perms, "edit", "users"));
        assert!(resolver.can(&perms, "view", "users"));
        assert_eq!(resolver.explain(&perms, "view", "users").matched, MatchedEntry::AnyType);
    }

    #[test]
    fn test_first_key_mode_integer_like_keys_keep_insertion_order() {
        let perms = map(&[("*", PermissionValue::Wildcard), ("2", list(&["x"]))]);
        let resolver = Resolver::new(WildcardMode::FirstKey);

        assert_eq!(perms.first_key(), Some("*"));
        assert!(resolver.can(&perms, "edit", "pages"));
        assert_eq!(resolver.explain(&perms, "x", "2").matched, MatchedEntry::AnyType);
    }

    #[test]
    fn test_first_key_mode_wildcard_not_first() {
        let perms = map(&[("users", list(&["edit"])), ("*", PermissionValue::Wildcard)]);
        let resolver = Resolver::new(WildcardMode::FirstKey);

        // "*" is just another key here
        assert!(!resolver.can(&perms, "edit", "pages"));
        assert!(resolver.can(&perms, "edit", "users"));
        assert!(resolver.can(&perms, "anything", "*"));
    }

    #[test]
    fn test_fallback_mode_is_order_independent() {
        let star_first = map(&[("*", list(&["view"])), ("users", PermissionValue::Wildcard)]);
        let star_last = map(&[("users", PermissionValue::Wildcard), ("*", list(&["view"]))]);
        let resolver = Resolver::new(WildcardMode::Fallback);

        for perms in [&star_first, &star_last] {
            assert!(resolver.can(perms, "edit", "users"));
            assert!(resolver.can(perms, "view", "pages"));
            assert!(!resolver.can(perms, "edit", "pages"));
            assert_eq!(resolver.explain(perms, "edit", "users").matched, MatchedEntry::Type);
            assert_eq!(resolver.explain(perms, "view", "pages").matched, MatchedEntry::AnyType);
        }
    }

    #[test]
    fn test_explicit_list_not_widened_by_wildcard() {
        let perms = map(&[("users", list(&["view"])), ("*", PermissionValue::Wildcard)]);
        let resolver = Resolver::new(WildcardMode::Fallback);

        assert!(!resolver.can(&perms, "delete", "users"));
        let decision = resolver.explain(&perms, "delete", "users");
        assert_eq!(
            decision,
            Decision {
                granted: false,
                matched: MatchedEntry::Type
            }
        );
    }

    #[test]
    fn test_can_is_idempotent() {
        let perms = map(&[("*", list(&["edit"])), ("users", list(&["view"]))]);
        let before = perms.clone();
        for mode in MODES {
            let resolver = Resolver::new(mode);
            let first = resolver.can(&perms, "edit", "users");
            let second = resolver.can(&perms, "edit", "users");
            assert_eq!(first, second);
        }
        assert_eq!(perms, before);
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(Resolver::default().mode(), WildcardMode::Fallback);
        assert_eq!(WildcardMode::default().to_string(), "fallback");
        assert_eq!(WildcardMode::parse(" FIRST_KEY "), Some(WildcardMode::FirstKey));
        assert_eq!(
            serde_json::to_string(&WildcardMode::FirstKey).unwrap(),
            r#""first_key""#
        );
    }
}
