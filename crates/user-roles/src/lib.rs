//! # User Roles
//!
//! Role-based access checks: given a role's permission map and a requested
//! (action, resource type) pair, decide whether the role grants the action.
//!
//! ## Overview
//!
//! The user-roles crate handles:
//! - **Permission values**: `"*"` (every action) or a list of action names
//! - **Permission maps**: resource type → permission value, with `"*"` as the
//!   any-type key
//! - **Roles**: a name bound to one permission map
//! - **Registry**: the name → map table, shared between threads
//! - **Resolver**: the decision function
//!
//! ## Permission Maps
//!
//! ```text
//! { "users": ["edit", "view"], "pages": "*" }   edit/view users, anything on pages
//! { "*": ["delete", "edit"] }                    delete/edit on every type
//! { "*": "*" }                                   everything
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use user_roles::{PermissionMap, PermissionValue, RoleRegistry};
//!
//! let registry = RoleRegistry::new();
//! registry.add(
//!     "admin",
//!     PermissionMap::new()
//!         .with("users", PermissionValue::actions(["edit", "view"]))
//!         .with("pages", PermissionValue::Wildcard),
//! );
//!
//! let admin = registry.get("admin").unwrap();
//! assert!(user_roles::can(&admin, "edit", "pages"));
//! assert!(!user_roles::can(&admin, "delete", "users"));
//! assert!(!user_roles::can(&admin, "view", "posts"));
//! ```
//!
//! ## Wildcard Type Resolution
//!
//! See [`resolver`] for the two supported rules. The default,
//! [`WildcardMode::Fallback`], consults `"*"` only for types without an
//! entry of their own. [`WildcardMode::FirstKey`] keeps the older
//! insertion-order rule.

pub mod error;
pub mod permissions;
pub mod registry;
pub mod resolver;
pub mod role;

// Re-export main types for convenience
pub use error::{RbacError, RbacResult};
pub use permissions::{Decoding, PermissionMap, PermissionValue, WILDCARD};
pub use registry::RoleRegistry;
pub use resolver::{can, Decision, MatchedEntry, Resolver, WildcardMode};
pub use role::Role;
