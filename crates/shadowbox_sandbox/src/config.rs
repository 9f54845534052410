//! Sandbox configuration.

use serde::{Deserialize, Serialize};

/// Sandbox configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Name used in log events
    pub label: Option<String>,
    /// Restore baseline keys the guest deleted, and replay those deletions
    /// on the next activation. When off, deletions are left in place.
    pub restore_deleted_keys: bool,
}

impl SandboxConfig {
    /// Create a new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: None,
            restore_deleted_keys: true,
        }
    }

    /// Set the log label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Enable/disable restoring deleted keys
    #[must_use]
    pub fn with_restore_deleted_keys(mut self, enable: bool) -> Self {
        self.restore_deleted_keys = enable;
        self
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SandboxConfig::default();
        assert!(config.label.is_none());
        assert!(config.restore_deleted_keys);
    }

    #[test]
    fn test_config_builders() {
        let config = SandboxConfig::new()
            .with_label("guest-a")
            .with_restore_deleted_keys(false);
        assert_eq!(config.label.as_deref(), Some("guest-a"));
        assert!(!config.restore_deleted_keys);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: SandboxConfig = serde_json::from_str(r#"{"label":"x"}"#).unwrap();
        assert_eq!(config.label.as_deref(), Some("x"));
        assert!(config.restore_deleted_keys);
    }
}
