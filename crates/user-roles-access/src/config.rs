//! Access configuration.
//!
//! Controls how the access context resolves wildcards and where role
//! definitions come from. Configuration is loaded from environment
//! variables with defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use user_roles::{Decoding, RbacError, Role, RoleRegistry, WildcardMode};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },

    /// Roles file could not be read.
    #[error("Failed to read roles file {}: {source}", .path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Role definitions could not be decoded.
    #[error(transparent)]
    Rbac(#[from] RbacError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Access context configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// How the `"*"` type key is resolved.
    pub wildcard_mode: WildcardMode,

    /// Role selected when a context is created.
    pub default_role: Option<String>,

    /// JSON file with role definitions (role name → permission map).
    pub roles_file: Option<PathBuf>,

    /// Deny malformed permission values instead of rejecting the file.
    pub lenient_values: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            wildcard_mode: WildcardMode::Fallback,
            default_role: None,
            roles_file: None,
            lenient_values: false,
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `USER_ROLES_WILDCARD_MODE`: `fallback` or `first_key` (default: fallback)
    /// - `USER_ROLES_DEFAULT_ROLE`: role selected on startup
    /// - `USER_ROLES_FILE`: path to a JSON role definitions file
    /// - `USER_ROLES_LENIENT`: deny malformed values instead of failing; `true`/`false`,
    ///   `1`/`0`, `yes`/`no` or `on`/`off`, any case (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let wildcard_mode = match lookup("USER_ROLES_WILDCARD_MODE") {
            Some(raw) => WildcardMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    fallback = %default.wildcard_mode,
                    "Unknown USER_ROLES_WILDCARD_MODE, using default"
                );
                default.wildcard_mode
            }),
            None => default.wildcard_mode,
        };

        let lenient_values = match lookup("USER_ROLES_LENIENT") {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    fallback = default.lenient_values,
                    "Unknown USER_ROLES_LENIENT, using default"
                );
                default.lenient_values
            }),
            None => default.lenient_values,
        };

        Self {
            wildcard_mode,
            default_role: lookup("USER_ROLES_DEFAULT_ROLE").filter(|s| !s.is_empty()),
            roles_file: lookup("USER_ROLES_FILE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            lenient_values,
        }
    }

    /// How permission values are decoded under this configuration.
    pub fn decoding(&self) -> Decoding {
        if self.lenient_values {
            Decoding::Lenient
        } else {
            Decoding::Strict
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(role) = &self.default_role {
            if role.trim() != role {
                return Err(ConfigError::InvalidValue {
                    key: "USER_ROLES_DEFAULT_ROLE".to_string(),
                    message: format!("role name {:?} has surrounding whitespace", role),
                });
            }
        }
        if let Some(path) = &self.roles_file {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                return Err(ConfigError::InvalidValue {
                    key: "USER_ROLES_FILE".to_string(),
                    message: format!("expected a .json file, got {}", path.display()),
                });
            }
        }
        Ok(())
    }

    /// Build a registry from the configured roles file.
    ///
    /// Without a roles file the registry starts empty. When a default role is
    /// configured it must be defined by the file.
    pub fn build_registry(&self) -> ConfigResult<RoleRegistry> {
        self.validate()?;

        let registry = match &self.roles_file {
            Some(path) => load_roles_file(path, self.decoding())?
                .into_iter()
                .collect::<RoleRegistry>(),
            None => RoleRegistry::new(),
        };

        if let (Some(role), Some(_)) = (&self.default_role, &self.roles_file) {
            if !registry.contains(role) {
                return Err(ConfigError::InvalidValue {
                    key: "USER_ROLES_DEFAULT_ROLE".to_string(),
                    message: format!("role '{}' is not defined in the roles file", role),
                });
            }
        }

        tracing::info!(
            roles = registry.len(),
            mode = %self.wildcard_mode,
            "Role registry ready"
        );
        Ok(registry)
    }
}

/// Parse a boolean flag value, ignoring case and surrounding whitespace.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse role definitions from a JSON string.
pub fn load_roles_str(json: &str, decoding: Decoding) -> ConfigResult<Vec<Role>> {
    Ok(Role::parse_set(json, decoding)?)
}

/// Read and parse role definitions from a JSON file.
pub fn load_roles_file(path: &Path, decoding: Decoding) -> ConfigResult<Vec<Role>> {
    tracing::debug!(path = %path.display(), "Loading role definitions");
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_roles_str(&json, decoding)
}
