//! Named roles and role-set decoding

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RbacResult;
use crate::permissions::{Decoding, PermissionMap, RawPermissionMap};

/// A role name paired with its permission map.
///
/// # Examples
///
/// ```
/// use user_roles::{PermissionMap, PermissionValue, Role};
///
/// let admin = Role::new("admin", PermissionMap::new().with("*", PermissionValue::Wildcard));
/// assert_eq!(admin.name, "admin");
/// assert!(admin.permissions.can("delete", "users"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name (registry key)
    pub name: String,

    /// Permissions granted by this role
    pub permissions: PermissionMap,
}

impl Role {
    /// Creates a new role.
    pub fn new(name: impl Into<String>, permissions: PermissionMap) -> Self {
        Self {
            name: name.into(),
            permissions,
        }
    }

    /// Parse a set of roles from a JSON object of role name to permission map.
    ///
    /// Roles are returned sorted by name. Key order inside each permission
    /// map is preserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use user_roles::{Decoding, Role};
    ///
    /// let roles = Role::parse_set(
    ///     r#"{
    ///         "editor": { "pages": ["edit", "view"] },
    ///         "admin": { "*": "*" }
    ///     }"#,
    ///     Decoding::Strict,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(roles.len(), 2);
    /// assert_eq!(roles[0].name, "admin");
    /// assert!(roles[1].permissions.can("edit", "pages"));
    /// ```
    pub fn parse_set(json: &str, decoding: Decoding) -> RbacResult<Vec<Role>> {
        let raw: BTreeMap<String, RawPermissionMap> = serde_json::from_str(json)?;
        raw.into_iter()
            .map(|(name, map)| Ok(Role::new(name, map.decode(decoding)?)))
            .collect()
    }
}
