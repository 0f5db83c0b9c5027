//! Construction-time sizing of snapshot objects.
use crate::error::{Error, Result};

/// The number of components a multi-writer snapshot holds by default.
pub const DEFAULT_COMPONENTS: usize = 10;

/// The number of processes a multi-writer snapshot admits by default.
pub const DEFAULT_PROCESSES: usize = 3;

/// Sizes of a snapshot object, fixed for its whole lifetime.
///
/// `components` is the number of independently updatable components, and
/// `processes` bounds the number of distinct threads that may scan or update
/// the object. For single-writer snapshots the two are equal.
///
/// # Examples
///
/// ```
/// use wfsnap_mem::SnapshotConfig;
///
/// let config = SnapshotConfig::default().with_components(4).with_processes(2);
/// assert!(config.validate().is_ok());
///
/// let empty = SnapshotConfig::new(0, 2);
/// assert!(empty.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotConfig {
    pub components: usize,
    pub processes: usize,
}

impl SnapshotConfig {
    pub fn new(components: usize, processes: usize) -> Self {
        Self {
            components,
            processes,
        }
    }

    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = processes;
        self
    }

    /// Checks that both sizes are positive.
    pub fn validate(&self) -> Result<()> {
        if self.components == 0 {
            return Err(Error::NoComponents);
        }
        if self.processes == 0 {
            return Err(Error::NoProcesses);
        }
        Ok(())
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COMPONENTS, DEFAULT_PROCESSES)
    }
}
