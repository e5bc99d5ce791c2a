//! # Role Registry
//!
//! Holds the name → permission map table. Entries are stored as shared
//! snapshots: `get` hands out an `Arc`, and `add` swaps in a new `Arc`
//! instead of mutating the old map, so an evaluation in progress always
//! sees the map it started with.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::permissions::PermissionMap;
use crate::role::Role;

/// Thread-safe registry of roles.
///
/// Construct one per application and share it (`Arc<RoleRegistry>`) with
/// whatever needs to resolve roles.
///
/// # Example
///
/// ```
/// use user_roles::{PermissionMap, PermissionValue, RoleRegistry};
///
/// let registry = RoleRegistry::new();
/// registry.add("admin", PermissionMap::new().with("*", PermissionValue::Wildcard));
///
/// let admin = registry.get("admin").unwrap();
/// assert!(admin.can("edit", "pages"));
/// assert!(registry.get("guest").is_none());
/// ```
#[derive(Debug, Default)]
pub struct RoleRegistry {
    roles: RwLock<HashMap<String, Arc<PermissionMap>>>,
}

impl RoleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }

    /// Register a role, replacing any previous map stored under `name`.
    ///
    /// The previous map is dropped, not merged. No validation is performed.
    ///
    /// # Returns
    ///
    /// The replaced map, if there was one
    pub fn add(&self, name: impl Into<String>, permissions: PermissionMap) -> Option<Arc<PermissionMap>> {
        let name = name.into();
        let entries = permissions.len();
        let previous = self
            .roles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), Arc::new(permissions));

        if previous.is_some() {
            tracing::debug!(role = %name, entries, "Replaced role");
        } else {
            tracing::debug!(role = %name, entries, "Registered role");
        }
        previous
    }

    /// Register a [`Role`].
    pub fn add_role(&self, role: Role) -> Option<Arc<PermissionMap>> {
        self.add(role.name, role.permissions)
    }

    /// Register several roles at once.
    pub fn extend<I>(&self, roles: I)
    where
        I: IntoIterator<Item = Role>,
    {
        for role in roles {
            self.add_role(role);
        }
    }

    /// Get the permission map stored for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<PermissionMap>> {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Get a copy of the role stored for `name`.
    pub fn role(&self, name: &str) -> Option<Role> {
        self.get(name)
            .map(|permissions| Role::new(name, PermissionMap::clone(&permissions)))
    }

    /// Check if a role named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered role names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .roles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Get the count of registered roles.
    pub fn len(&self) -> usize {
        self.roles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Role> for RoleRegistry {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let registry = RoleRegistry::new();
        registry.extend(iter);
        registry
    }
}
