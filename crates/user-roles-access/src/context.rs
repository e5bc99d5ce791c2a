//! Access context for the current user's role
//!
//! This module provides the AccessContext type that a host application
//! injects into whatever needs permission checks. It holds the role
//! registry, the currently selected role, and the wildcard mode, and
//! answers `can(action, type)` for the current role.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use user_roles::{Decision, MatchedEntry, RbacError, RbacResult, Resolver, RoleRegistry, WildcardMode};

use crate::config::AccessConfig;

/// The current user's access context.
///
/// The role slot starts empty. Until a registered role is selected every
/// check is denied.
///
/// # Use Cases
///
/// - Conditionally rendering UI elements
/// - Gating handlers and code paths
/// - Switching the active role after login
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use user_roles::{PermissionMap, PermissionValue, RoleRegistry};
/// use user_roles_access::AccessContext;
///
/// let registry = Arc::new(RoleRegistry::new());
/// registry.add("admin", PermissionMap::new().with("pages", PermissionValue::Wildcard));
///
/// let ctx = AccessContext::new(registry);
/// assert!(!ctx.can("edit", "pages"));
///
/// ctx.set_role("admin");
/// assert!(ctx.can("edit", "pages"));
/// ```
pub struct AccessContext {
    /// Shared role registry
    registry: Arc<RoleRegistry>,

    /// Resolver used for every check
    resolver: Resolver,

    /// Currently selected role name
    current_role: RwLock<String>,
}

impl fmt::Debug for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessContext")
            .field("current_role", &self.current_role())
            .field("mode", &self.resolver.mode())
            .field("roles", &self.registry.len())
            .finish()
    }
}

impl AccessContext {
    /// Creates a context with no role selected and the default wildcard mode.
    ///
    /// # Arguments
    ///
    /// * `registry` - The role registry to resolve role names against
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            resolver: Resolver::default(),
            current_role: RwLock::new(String::new()),
        }
    }

    /// Creates a context from configuration.
    ///
    /// Applies the configured wildcard mode and selects the default role,
    /// if one is configured.
    pub fn from_config(registry: Arc<RoleRegistry>, config: &AccessConfig) -> Self {
        let ctx = Self::new(registry).with_mode(config.wildcard_mode);
        if let Some(role) = &config.default_role {
            ctx.set_role(role.clone());
        }
        ctx
    }

    /// Use a different wildcard mode.
    pub fn with_mode(mut self, mode: WildcardMode) -> Self {
        self.resolver = Resolver::new(mode);
        self
    }

    /// Select a role.
    pub fn with_role(self, role: impl Into<String>) -> Self {
        self.set_role(role);
        self
    }

    /// The wildcard mode in use.
    pub fn mode(&self) -> WildcardMode {
        self.resolver.mode()
    }

    /// The registry this context resolves against.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Switch the current role.
    ///
    /// The name is not checked against the registry; selecting an unknown
    /// role makes every check deny until a known role is selected.
    pub fn set_role(&self, role: impl Into<String>) {
        let role = role.into();
        if !self.registry.contains(&role) {
            tracing::debug!(role = %role, "Selected role is not registered");
        }
        *self.current_role.write().unwrap_or_else(PoisonError::into_inner) = role;
    }

    /// Clear the current role.
    pub fn clear_role(&self) {
        self.current_role
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The currently selected role name (empty when none is selected).
    pub fn current_role(&self) -> String {
        self.current_role
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check whether the current role may perform `action` on `resource_type`.
    ///
    /// An unknown or unselected role is denied.
    pub fn can(&self, action: &str, resource_type: &str) -> bool {
        self.can_as(&self.current_role(), action, resource_type)
    }

    /// Like [`can`](Self::can), but reports an unknown current role as an error.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::UnknownRole`] if the current role is not registered.
    pub fn try_can(&self, action: &str, resource_type: &str) -> RbacResult<bool> {
        self.explain(action, resource_type).map(|d| d.granted)
    }

    /// Evaluate the current role and report which entry decided.
    pub fn explain(&self, action: &str, resource_type: &str) -> RbacResult<Decision> {
        let role = self.current_role();
        let permissions = self
            .registry
            .get(&role)
            .ok_or_else(|| RbacError::UnknownRole(role.clone()))?;

        let decision = self.resolver.explain(&permissions, action, resource_type);
        tracing::trace!(
            role = %role,
            action = %action,
            resource_type = %resource_type,
            granted = decision.granted,
            "Access check"
        );
        Ok(decision)
    }

    /// Check whether `role` may perform `action` on `resource_type`.
    ///
    /// An unknown role is denied.
    pub fn can_as(&self, role: &str, action: &str, resource_type: &str) -> bool {
        let Some(permissions) = self.registry.get(role) else {
            tracing::debug!(
                role = %role,
                action = %action,
                resource_type = %resource_type,
                "Access denied: unknown role"
            );
            return false;
        };

        let decision = self.resolver.explain(&permissions, action, resource_type);
        if decision.matched == MatchedEntry::Missing {
            tracing::trace!(role = %role, resource_type = %resource_type, "No entry for resource type");
        }
        decision.granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use user_roles::{PermissionMap, PermissionValue};

    fn registry() -> Arc<RoleRegistry> {
        let registry = RoleRegistry::new();
        registry.add(
            "admin",
            PermissionMap::new()
                .with("users", PermissionValue::actions(["edit", "view"]))
                .with("pages", PermissionValue::Wildcard),
        );
        registry.add(
            "editor",
            PermissionMap::new().with("*", PermissionValue::actions(["delete", "edit"])),
        );
        Arc::new(registry)
    }

    #[test]
    fn test_role_slot_starts_empty() {
        let ctx = AccessContext::new(registry());
        assert_eq!(ctx.current_role(), "");
        assert!(!ctx.can("view", "users"));
    }

    #[test]
    fn test_switch_role() {
        let ctx = AccessContext::new(registry());

        ctx.set_role("admin");
        assert_eq!(ctx.current_role(), "admin");
        assert!(ctx.can("edit", "pages"));
        assert!(!ctx.can("edit", "posts"));

        ctx.set_role("editor");
        assert!(ctx.can("edit", "posts"));
        assert!(!ctx.can("view", "users"));

        ctx.clear_role();
        assert!(!ctx.can("edit", "posts"));
    }

    #[test]
    fn test_unknown_role_denied() {
        let ctx = AccessContext::new(registry()).with_role("ghost");
        assert!(!ctx.can("view", "users"));

        let err = ctx.try_can("view", "users").unwrap_err();
        assert!(matches!(err, RbacError::UnknownRole(ref name) if name == "ghost"));
    }

    #[test]
    fn test_try_can_known_role() {
        let ctx = AccessContext::new(registry()).with_role("admin");
        assert!(ctx.try_can("view", "users").unwrap());
        assert!(!ctx.try_can("delete", "users").unwrap());

        let decision = ctx.explain("anything", "pages").unwrap();
        assert!(decision.granted);
        assert_eq!(decision.matched, MatchedEntry::Type);
    }

    #[test]
    fn test_can_as() {
        let ctx = AccessContext::new(registry());
        assert!(ctx.can_as("admin", "view", "users"));
        assert!(ctx.can_as("editor", "delete", "comments"));
        assert!(!ctx.can_as("nobody", "view", "users"));
        assert_eq!(ctx.current_role(), "");
    }

    #[test]
    fn test_sees_later_registrations() {
        let registry = registry();
        let ctx = AccessContext::new(Arc::clone(&registry)).with_role("viewer");
        assert!(!ctx.can("view", "pages"));

        registry.add("viewer", PermissionMap::new().with("pages", PermissionValue::actions(["view"])));
        assert!(ctx.can("view", "pages"));
    }

    #[test]
    fn test_mode_from_config() {
        let registry = registry();
        registry.add(
            "mixed",
            PermissionMap::new()
                .with("*", PermissionValue::Wildcard)
                .with("users", PermissionValue::actions(["view"])),
        );

        let config = AccessConfig {
            wildcard_mode: WildcardMode::FirstKey,
            default_role: Some("mixed".to_string()),
            ..AccessConfig::default()
        };
        let legacy = AccessContext::from_config(Arc::clone(&registry), &config);
        assert_eq!(legacy.mode(), WildcardMode::FirstKey);
        assert_eq!(legacy.current_role(), "mixed");
        assert!(legacy.can("edit", "users"));

        let ctx = AccessContext::new(registry).with_role("mixed");
        assert_eq!(ctx.mode(), WildcardMode::Fallback);
        assert!(!ctx.can("edit", "users"));
        assert!(ctx.can("edit", "pages"));
    }
}
