//! Unique identifiers for SHADOWBOX entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sandbox identifier - identifies one guest's sandbox in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SandboxId(Uuid);

impl SandboxId {
    /// Create a new random SandboxId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Create from a guest name, stable across runs
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SandboxId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SandboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sbx_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = SandboxId::new();
        assert_ne!(id, SandboxId::new());
    }

    #[test]
    fn test_id_from_bytes() {
        let bytes = [7u8; 16];
        let id = SandboxId::from_bytes(bytes);
        assert_eq!(id.as_uuid().as_bytes(), &bytes);
    }

    #[test]
    fn test_id_display() {
        let s = format!("{}", SandboxId::new());
        assert!(s.starts_with("sbx_"));
    }

    #[test]
    fn test_id_from_name() {
        assert_eq!(SandboxId::from_name("guest-a"), SandboxId::from_name("guest-a"));
        assert_ne!(SandboxId::from_name("guest-a"), SandboxId::from_name("guest-b"));
    }
}
