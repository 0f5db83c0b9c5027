//! Utilities for testing shared-memory snapshot objects.
//!
//! * [`WGLChecker`] decides whether a [`History`] of concurrent operations
//!   is linearizable with respect to a sequential [`Specification`].
//! * [`SnapshotSpecification`] is the sequential specification of a
//!   snapshot object.
pub mod linearizability;
pub mod specifications;

pub use linearizability::history::{Action, History};
pub use linearizability::WGLChecker;

pub use specifications::snapshot::{SnapshotOperation, SnapshotSpecification};
pub use specifications::Specification;
