//! Property snapshots of a target object.

use crate::error::{SandboxError, SandboxResult};
use indexmap::IndexMap;
use shadowbox_core::{ObjectRef, Value};

/// Resolve the target to its object handle
///
/// # Errors
///
/// Returns `InvalidTarget` if the target is not an object
pub fn target_object(target: &Value) -> SandboxResult<&ObjectRef> {
    target.as_object().ok_or_else(|| {
        SandboxError::invalid_target(format!(
            "expected an object, got {}",
            target.type_name()
        ))
    })
}

/// The target's own enumerable keys, in insertion order.
///
/// Evaluated fresh on every call; nothing is cached.
///
/// # Errors
///
/// Returns `InvalidTarget` if the target is not an object
pub fn own_enumerable_keys(target: &Value) -> SandboxResult<Vec<String>> {
    Ok(target_object(target)?.own_enumerable_keys())
}

/// Key/value copy of a target's enumerable properties.
///
/// Values are copied shallowly: object values keep their identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: IndexMap<String, Value>,
}

impl Snapshot {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the target's enumerable properties
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target is not an object
    pub fn capture(target: &Value) -> SandboxResult<Self> {
        Ok(Self::capture_object(target_object(target)?))
    }

    /// Capture an object's enumerable properties
    #[must_use]
    pub fn capture_object(object: &ObjectRef) -> Self {
        Self {
            entries: object.enumerable_entries().into_iter().collect(),
        }
    }

    /// Get a captured value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Check if a key was captured
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Captured keys in capture order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Captured entries in capture order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of captured keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether an object's enumerable properties match this snapshot:
    /// same key set, strictly equal values.
    #[must_use]
    pub fn matches(&self, object: &ObjectRef) -> bool {
        let current = object.enumerable_entries();
        current.len() == self.entries.len()
            && current
                .iter()
                .all(|(key, value)| self.get(key).is_some_and(|v| v.strict_eq(value)))
    }
}
