//! Core error types for SHADOWBOX.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Write to a non-writable property
    ReadOnly {
        /// Property key
        key: String,
    },

    /// Delete or redefine of a non-configurable property
    NonConfigurable {
        /// Property key
        key: String,
    },

    /// Object graph contains a cycle
    CyclicValue,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { key } => write!(f, "Property is read-only: {}", key),
            Self::NonConfigurable { key } => {
                write!(f, "Property is not configurable: {}", key)
            }
            Self::CyclicValue => write!(f, "Cyclic object graph"),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::CyclicValue;
        assert_eq!(format!("{}", err), "Cyclic object graph");

        let err = CoreError::ReadOnly {
            key: "name".to_string(),
        };
        assert_eq!(format!("{}", err), "Property is read-only: name");

        let err = CoreError::NonConfigurable {
            key: "data".to_string(),
        };
        assert_eq!(format!("{}", err), "Property is not configurable: data");
    }

    #[test]
    fn test_error_equality() {
        let err1 = CoreError::CyclicValue;
        let err2 = CoreError::CyclicValue;
        assert_eq!(err1, err2);

        let err3 = CoreError::NonConfigurable {
            key: "a".to_string(),
        };
        assert_ne!(err1, err3);
    }
}
