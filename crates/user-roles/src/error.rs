//! Error types for role lookup and permission decoding
//!
//! The resolver itself never fails; these errors come from the fallible
//! edges around it: looking up a role by name and decoding permission maps.

use thiserror::Error;

/// RBAC error types.
#[derive(Debug, Error)]
pub enum RbacError {
    /// No role with this name was registered
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A permission value is neither `"*"` nor a list of action names
    #[error("Malformed permission value for '{resource_type}': {reason}")]
    MalformedPermissionValue {
        /// Resource type key the value was stored under.
        resource_type: String,
        /// What was found instead.
        reason: String,
    },

    /// JSON syntax or structure error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::UnknownRole(_) => "UNKNOWN_ROLE",
            RbacError::MalformedPermissionValue { .. } => "MALFORMED_PERMISSION_VALUE",
            RbacError::Json(_) => "JSON_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RbacError::UnknownRole("guest".into()).error_code(), "UNKNOWN_ROLE");
        let malformed = RbacError::MalformedPermissionValue {
            resource_type: "pages".into(),
            reason: "number".into(),
        };
        assert_eq!(malformed.error_code(), "MALFORMED_PERMISSION_VALUE");
    }

    #[test]
    fn test_error_display() {
        let err = RbacError::UnknownRole("editor".into());
        assert_eq!(err.to_string(), "Unknown role: editor");

        let err = RbacError::MalformedPermissionValue {
            resource_type: "pages".into(),
            reason: "expected \"*\" or an array of strings, found string \"edit\"".into(),
        };
        assert!(err.to_string().starts_with("Malformed permission value for 'pages'"));
    }
}
