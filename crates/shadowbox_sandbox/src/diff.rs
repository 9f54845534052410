//! Change sets between a baseline snapshot and the live target.

use crate::error::SandboxResult;
use crate::snapshot::Snapshot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shadowbox_core::{ObjectRef, Property, Value};
use std::collections::BTreeMap;

/// A guest mutation saved for replay
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    /// Key held this value when the guest was deactivated
    Set(Value),
    /// Guest removed this baseline key
    Removed,
}

/// Guest mutations saved across a deactivate/activate cycle, ordered by key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    changes: BTreeMap<String, PendingChange>,
}

impl PendingChanges {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the change recorded for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PendingChange> {
        self.changes.get(key)
    }

    /// Recorded changes in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PendingChange)> {
        self.changes.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Number of recorded keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if nothing is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Drop every recorded change
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Check that every replay write would be accepted by the target
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` naming the first rejected key
    pub fn validate(&self, target: &ObjectRef) -> SandboxResult<()> {
        for (key, change) in &self.changes {
            match change {
                PendingChange::Set(_) => target.check_set(key)?,
                PendingChange::Removed => target.check_delete(key)?,
            }
        }
        Ok(())
    }

    /// Write the recorded changes onto the target, in ascending key order.
    /// Returns the number of keys written.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target rejects a write
    pub fn replay(&self, target: &ObjectRef) -> SandboxResult<usize> {
        for (key, change) in &self.changes {
            match change {
                PendingChange::Set(value) => {
                    tracing::trace!(key = %key, "replaying guest value");
                    target.set(key, value.clone())?;
                }
                PendingChange::Removed => {
                    tracing::trace!(key = %key, "replaying guest removal");
                    target.delete(key)?;
                }
            }
        }
        Ok(self.changes.len())
    }
}

impl FromIterator<(String, PendingChange)> for PendingChanges {
    fn from_iter<I: IntoIterator<Item = (String, PendingChange)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// How a property differs from the baseline
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    /// Present in both, not strictly equal
    Modified {
        /// Baseline value
        baseline: Value,
        /// Current value
        current: Value,
    },
    /// Present now, absent from the baseline
    Added {
        /// Current value
        current: Value,
    },
    /// In the baseline, no longer enumerable on the target
    Deleted {
        /// Baseline value
        baseline: Value,
    },
}

/// A single differing property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    /// Property key
    pub key: String,
    /// Kind of change
    pub kind: ChangeKind,
}

/// Change counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Keys whose value changed
    pub modified: usize,
    /// Keys the guest added
    pub added: usize,
    /// Baseline keys the guest deleted
    pub deleted: usize,
}

impl DiffSummary {
    /// Total number of changed keys
    #[must_use]
    pub fn total(&self) -> usize {
        self.modified + self.added + self.deleted
    }
}

/// Differences between a baseline and the live target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<PropertyChange>,
}

impl ChangeSet {
    /// Compare the target's enumerable properties against the baseline.
    ///
    /// Target keys come first in target order, then deleted baseline keys in
    /// baseline order. Deletions are only reported when `track_deleted` is set.
    #[must_use]
    pub fn compute(baseline: &Snapshot, target: &ObjectRef, track_deleted: bool) -> Self {
        let current: IndexMap<String, Value> = target.enumerable_entries().into_iter().collect();
        let mut changes = Vec::new();

        for (key, value) in &current {
            let kind = match baseline.get(key) {
                Some(old) if old.strict_eq(value) => continue,
                Some(old) => ChangeKind::Modified {
                    baseline: old.clone(),
                    current: value.clone(),
                },
                None => ChangeKind::Added {
                    current: value.clone(),
                },
            };
            changes.push(PropertyChange {
                key: key.clone(),
                kind,
            });
        }

        if track_deleted {
            for (key, old) in baseline.iter() {
                if !current.contains_key(key) {
                    changes.push(PropertyChange {
                        key: key.to_string(),
                        kind: ChangeKind::Deleted {
                            baseline: old.clone(),
                        },
                    });
                }
            }
        }

        Self { changes }
    }

    /// Changes in report order
    #[must_use]
    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    /// Number of changed keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if the target matches the baseline
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Count changes by kind
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for change in &self.changes {
            match change.kind {
                ChangeKind::Modified { .. } => summary.modified += 1,
                ChangeKind::Added { .. } => summary.added += 1,
                ChangeKind::Deleted { .. } => summary.deleted += 1,
            }
        }
        summary
    }

    /// The guest's state as replayable changes
    #[must_use]
    pub fn pending(&self) -> PendingChanges {
        self.changes
            .iter()
            .map(|change| {
                let pending = match &change.kind {
                    ChangeKind::Modified { current, .. } | ChangeKind::Added { current } => {
                        PendingChange::Set(current.clone())
                    }
                    ChangeKind::Deleted { .. } => PendingChange::Removed,
                };
                (change.key.clone(), pending)
            })
            .collect()
    }

    /// Check that every restore write would be accepted by the target
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` naming the first rejected key
    pub fn validate(&self, target: &ObjectRef) -> SandboxResult<()> {
        for change in &self.changes {
            match change.kind {
                ChangeKind::Modified { .. } => target.check_set(&change.key)?,
                ChangeKind::Added { .. } | ChangeKind::Deleted { .. } => {
                    target.check_delete(&change.key)?
                }
            }
        }
        Ok(())
    }

    /// Put the baseline back: rewrite modified keys, remove added keys and
    /// re-add deleted keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target rejects a write
    pub fn restore(&self, target: &ObjectRef) -> SandboxResult<()> {
        for change in &self.changes {
            match &change.kind {
                ChangeKind::Modified { baseline, .. } => {
                    tracing::trace!(key = %change.key, "reverting modified key");
                    target.set(&change.key, baseline.clone())?;
                }
                ChangeKind::Added { .. } => {
                    tracing::trace!(key = %change.key, "removing added key");
                    target.delete(&change.key)?;
                }
                ChangeKind::Deleted { baseline } => {
                    tracing::trace!(key = %change.key, "restoring deleted key");
                    target.define(&change.key, Property::new(baseline.clone()))?;
                }
            }
        }
        Ok(())
    }
}
