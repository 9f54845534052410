//! Sandbox errors.

use shadowbox_core::CoreError;

/// Sandbox result type
pub type SandboxResult<T> = Result<T, SandboxError>;

/// Sandbox errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    /// Target is not a keyed object, or rejected a write
    #[error("Invalid target: {reason}")]
    InvalidTarget {
        /// What went wrong
        reason: String,
    },

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl SandboxError {
    /// Build an `InvalidTarget` error
    #[must_use]
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }
}

// Attribute violations surface as an unusable target, at the failing write.
impl From<CoreError> for SandboxError {
    fn from(err: CoreError) -> Self {
        Self::invalid_target(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SandboxError::invalid_target("got null");
        assert_eq!(err.to_string(), "Invalid target: got null");
    }

    #[test]
    fn test_from_core_error() {
        let err: SandboxError = CoreError::ReadOnly {
            key: "name".to_string(),
        }
        .into();
        match err {
            SandboxError::InvalidTarget { reason } => assert!(reason.contains("name")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
