//! The snapshot sandbox state machine.
//!
//! A [`Sandbox`] guards one guest's view of a shared target object:
//!
//! - [`Sandbox::activate`] snapshots the target as the baseline, then replays
//!   the guest's saved changes onto it.
//! - [`Sandbox::deactivate`] diffs the target against the baseline, saves the
//!   differences as the guest's changes and writes the baseline back.
//!
//! The target is only ever mutated in place. Both transitions validate every
//! write before applying any, so a rejected write leaves the target and the
//! sandbox as they were.
//!
//! At most one sandbox may be active on a target at a time. The sandbox does
//! not enforce this; the caller sequences guests.

use crate::config::SandboxConfig;
use crate::diff::{ChangeSet, DiffSummary, PendingChanges};
use crate::error::{SandboxError, SandboxResult};
use crate::snapshot::{target_object, Snapshot};
use serde::{Deserialize, Serialize};
use shadowbox_core::{ObjectRef, SandboxId, Value};

/// Sandbox lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxState {
    /// Guest mutations are reverted
    Inactive,
    /// Guest may mutate the target
    Active,
}

impl std::fmt::Display for SandboxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "inactive"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Outcome of an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    /// Keys captured in the new baseline
    pub baseline_keys: usize,
    /// Guest changes written back onto the target
    pub replayed: usize,
    /// Sandbox was already active
    pub was_active: bool,
}

/// Outcome of a deactivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivationReport {
    /// Changes reverted on the target
    pub reverted: DiffSummary,
    /// Sandbox was active; `false` means nothing happened
    pub was_active: bool,
}

/// Snapshot sandbox for one guest
#[derive(Debug)]
pub struct Sandbox {
    /// Sandbox identity for logs
    id: SandboxId,
    /// Sandbox configuration
    config: SandboxConfig,
    /// Shared object under isolation
    target: Value,
    /// Target properties at the latest activation
    baseline: Snapshot,
    /// Guest changes to replay on the next activation
    pending: PendingChanges,
    /// Lifecycle state
    state: SandboxState,
}

impl Sandbox {
    /// Create an inactive sandbox over a target
    #[must_use]
    pub fn new(target: impl Into<Value>) -> Self {
        Self {
            id: SandboxId::new(),
            config: SandboxConfig::default(),
            target: target.into(),
            baseline: Snapshot::new(),
            pending: PendingChanges::new(),
            state: SandboxState::Inactive,
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: SandboxConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sandbox ID
    #[must_use]
    pub fn with_id(mut self, id: SandboxId) -> Self {
        self.id = id;
        self
    }

    /// Snapshot the target and replay the guest's saved changes.
    ///
    /// Calling this while already active first saves and reverts the guest's
    /// current changes, then snapshots and replays as usual, so a repeated
    /// activation leaves the target and the saved changes as they were.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target is not an object or rejects a
    /// replayed write. Nothing is changed in that case.
    pub fn activate(&mut self) -> SandboxResult<ActivationReport> {
        let object = target_object(&self.target)?.clone();
        let was_active = self.is_active();
        if was_active {
            tracing::warn!(
                sandbox = %self.id,
                label = self.label(),
                "activate called on an active sandbox, cycling guest changes"
            );
            // Every replayed write undoes a validated restore write, so the
            // replay below cannot be rejected after this succeeds.
            self.revert_guest(&object)?;
        }

        let baseline = Snapshot::capture_object(&object);
        self.pending.validate(&object)?;
        let replayed = self.pending.replay(&object)?;

        let report = ActivationReport {
            baseline_keys: baseline.len(),
            replayed,
            was_active,
        };
        self.baseline = baseline;
        self.state = SandboxState::Active;

        tracing::debug!(
            sandbox = %self.id,
            label = self.label(),
            baseline_keys = report.baseline_keys,
            replayed = report.replayed,
            "sandbox activated"
        );
        Ok(report)
    }

    /// Save the guest's changes and restore the baseline.
    ///
    /// Saved changes are rebuilt from scratch on every call. Calling this
    /// while inactive does nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the target is not an object or rejects a
    /// restoring write. Nothing is changed in that case and the sandbox
    /// stays active.
    pub fn deactivate(&mut self) -> SandboxResult<DeactivationReport> {
        if !self.is_active() {
            tracing::debug!(sandbox = %self.id, label = self.label(), "sandbox already inactive");
            return Ok(DeactivationReport {
                reverted: DiffSummary::default(),
                was_active: false,
            });
        }

        let object = target_object(&self.target)?.clone();
        let reverted = self.revert_guest(&object)?;
        self.state = SandboxState::Inactive;

        tracing::debug!(
            sandbox = %self.id,
            label = self.label(),
            modified = reverted.modified,
            added = reverted.added,
            deleted = reverted.deleted,
            "sandbox deactivated"
        );
        Ok(DeactivationReport {
            reverted,
            was_active: true,
        })
    }

    /// Diff against the baseline, restore it and keep the diff as pending.
    fn revert_guest(&mut self, object: &ObjectRef) -> SandboxResult<DiffSummary> {
        let changes =
            ChangeSet::compute(&self.baseline, object, self.config.restore_deleted_keys);
        changes.validate(object)?;
        changes.restore(object)?;
        self.pending = changes.pending();
        Ok(changes.summary())
    }

    /// Forget the guest's saved changes, so the next activation starts from
    /// the target as it is.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while active
    pub fn discard_pending(&mut self) -> SandboxResult<()> {
        if self.is_active() {
            return Err(SandboxError::InvalidState(
                "cannot discard guest changes while active".to_string(),
            ));
        }
        tracing::debug!(
            sandbox = %self.id,
            label = self.label(),
            discarded = self.pending.len(),
            "guest changes discarded"
        );
        self.pending.clear();
        Ok(())
    }

    /// Get the sandbox ID
    #[must_use]
    pub fn id(&self) -> SandboxId {
        self.id
    }

    /// Get the config
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Get the target
    #[must_use]
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// Get the current state
    #[must_use]
    pub fn state(&self) -> SandboxState {
        self.state
    }

    /// Check if the guest is active
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == SandboxState::Active
    }

    /// Baseline from the latest activation
    #[must_use]
    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    /// Guest changes saved at the latest deactivation
    #[must_use]
    pub fn pending_changes(&self) -> &PendingChanges {
        &self.pending
    }

    fn label(&self) -> &str {
        self.config.label.as_deref().unwrap_or("")
    }
}
