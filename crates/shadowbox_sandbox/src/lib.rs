//! SHADOWBOX Snapshot Sandbox
//!
//! Lets a guest mutate a shared object freely while active, reverts those
//! mutations on deactivation, and replays them on the next activation.
//! The shared object is never replaced or cloned; only its properties change.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod diff;
pub mod error;
pub mod sandbox;
pub mod snapshot;

pub use config::SandboxConfig;
pub use diff::{ChangeKind, ChangeSet, DiffSummary, PendingChange, PendingChanges, PropertyChange};
pub use error::{SandboxError, SandboxResult};
pub use sandbox::{ActivationReport, DeactivationReport, Sandbox, SandboxState};
pub use snapshot::{own_enumerable_keys, Snapshot};
