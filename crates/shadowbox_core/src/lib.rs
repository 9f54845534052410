//! SHADOWBOX Core Types
//!
//! The object model a sandbox isolates: tagged values, shared objects with
//! property attributes, and identifiers.
//! This crate contains pure types and logic with no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod value;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use id::SandboxId;
pub use value::{Object, ObjectRef, Property, Value};
