//! # User Roles Access
//!
//! Host-facing access checks built on `user-roles`.
//!
//! ## Overview
//!
//! - **AccessContext**: the current role plus the shared registry; answers
//!   `can(action, type)` for UI rendering and code-path gating
//! - **AccessConfig**: wildcard mode, default role and role definitions file,
//!   loaded from the environment
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use user_roles_access::{AccessConfig, AccessContext};
//!
//! let config = AccessConfig::from_env();
//! let registry = Arc::new(config.build_registry().unwrap());
//! let ctx = AccessContext::from_config(registry, &config);
//!
//! if ctx.can("view", "users") {
//!     // show the users link
//! }
//! ```
//!
//! ## Role Files
//!
//! ```json
//! {
//!   "admin":  { "*": "*" },
//!   "editor": { "pages": ["edit", "view"], "users": ["view"] }
//! }
//! ```

pub mod config;
pub mod context;

// Re-export main types
pub use config::{load_roles_file, load_roles_str, AccessConfig, ConfigError, ConfigResult};
pub use context::AccessContext;
