//! Shared snapshot objects.
//!
//! A snapshot object has a fixed number of components. Processes update
//! components and _scan_ the object to obtain a [`View`] of every component
//! at a single instant.
//!
//! * [`SingleWriterSnapshot`] gives each of `N` processes exactly one component,
//!   which only it may update.
//! * [`MultiWriterSnapshot`] lets any of its processes update any of its
//!   components, and assigns process identities to threads implicitly.
//! * [`LockedSnapshot`] protects a plain array with a mutex. It is **not**
//!   lock-free and exists as a reference to compare the others against.
//!
//! # Examples
//!
//! Obtain a consistent view of shared memory.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use wfsnap_mem::snapshot::{SingleWriterSnapshot, Snapshot};
//!
//! const N: usize = 4;
//!
//! let snapshot: Arc<SingleWriterSnapshot<u32>> = Arc::new(SingleWriterSnapshot::new(N).unwrap());
//!
//! let mut handles = Vec::new();
//! for i in 1..N {
//!     let snapshot = snapshot.clone();
//!     handles.push(thread::spawn(move || {
//!         // Each thread marks its own component to show it has taken a step.
//!         snapshot.update(i, 1);
//!     }));
//! }
//!
//! snapshot.update(0, 1);
//!
//! // The main thread learns which threads had taken a step at a single instant.
//! let view = snapshot.scan(0);
//! let stepped: Vec<usize> = view
//!     .iter()
//!     .enumerate()
//!     .filter(|(_, v)| v.is_some())
//!     .map(|(i, _)| i)
//!     .collect();
//! assert!(stepped.contains(&0));
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! ```
mod locked;
pub use locked::LockedSnapshot;
pub mod multi_writer;
pub use multi_writer::{MultiWriterMutexSnapshot, MultiWriterSnapshot};
pub mod single_writer;
pub use single_writer::{SingleWriterMutexSnapshot, SingleWriterSnapshot};

/// An ID for a process (or thread).
pub type ProcessId = usize;

/// The value of every component of a snapshot object, `None` where nothing
/// has been published yet.
pub type View<T> = Vec<Option<T>>;

/// A snapshot object in which process _i_ owns component _i_.
pub trait Snapshot {
    type Value: Clone;

    /// Returns the number of components in the object.
    fn components(&self) -> usize;

    /// Returns a view containing the value of each component in the object.
    fn scan(&self, i: ProcessId) -> View<Self::Value>;

    /// Sets contents of the _i^{th}_ component to the specified value.
    fn update(&self, i: ProcessId, value: Self::Value);
}

/// Where the view returned by a scan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSource {
    /// Two consecutive collects agreed, and the second was returned.
    Collected,
    /// The given process was seen moving too often, and the view it obtained
    /// during its own update was returned instead.
    Borrowed(ProcessId),
}

/// The outcome of a scan, with the information needed to reason about how it
/// terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport<T> {
    pub view: View<T>,
    /// Number of double collects performed.
    pub rounds: usize,
    pub source: ViewSource,
}

/// Panics unless `i` is one of `n` indices. Misrouted indices are
/// programming errors rather than runtime conditions.
#[track_caller]
pub(crate) fn check_index(kind: &str, i: usize, n: usize) {
    assert!(i < n, "{kind} {i} out of range, expected fewer than {n}");
}
