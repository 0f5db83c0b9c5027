//! Bounded wait-free atomic snapshot objects for shared-memory systems.
//!
//! A snapshot object gives each process a component it can update, and lets
//! any process obtain a consistent view of every component at once, without
//! locks. See [`snapshot`] for the single-writer and multi-writer variants.
pub mod config;
pub mod error;
pub mod handshake;
pub mod identity;
pub mod register;
pub mod snapshot;
pub(crate) mod sync;

pub use config::SnapshotConfig;
pub use error::{Error, Result};
pub use snapshot::{ProcessId, Snapshot, View};
