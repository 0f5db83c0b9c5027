//! Errors raised while configuring a snapshot object.
//!
//! The snapshot algorithms themselves never fail: every `scan` and `update`
//! finishes in a bounded number of steps. The only failures are configuration
//! mistakes, which are reported to the caller immediately.

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The object was configured with zero components.
    #[error("a snapshot object needs at least one component")]
    NoComponents,

    /// The object was configured with zero processes.
    #[error("a snapshot object needs at least one process")]
    NoProcesses,

    /// More threads took part than the object was configured for.
    #[error("all {capacity} process identities are already assigned")]
    IdentitiesExhausted { capacity: usize },
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
