//! A sequential specification of a [snapshot object](https://en.wikipedia.org/wiki/Shared_snapshot_objects).
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::specifications::Specification;

use SnapshotOperation::{Scan, Update};

/// A process identifier.
pub type ProcessId = usize;

/// An operation for a snapshot object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOperation<T> {
    /// Scan the object and return a view containing the value of each
    /// component, `None` where nothing was written yet.
    ///
    /// If the return value of a scan is not-yet-known, this can be represented
    /// as `Scan(pid, None)`.
    Scan(ProcessId, Option<Vec<Option<T>>>),
    /// Set the given component of the object to a value.
    Update(usize, T),
}

/// A specification of a snapshot object with a fixed number of components.
///
/// Each component holds an `Option<T>` that starts out as `None`.
///
/// # Examples
///
/// ```
/// use wfsnap_utils::{SnapshotOperation::*, SnapshotSpecification, Specification};
///
/// let spec: SnapshotSpecification<u32> = SnapshotSpecification::new(2);
/// let (valid, state) = spec.apply(&Update(1, 7), &spec.init());
/// assert!(valid);
/// assert_eq!(state, vec![None, Some(7)]);
///
/// let (valid, _) = spec.apply(&Scan(0, Some(vec![None, None])), &state);
/// assert!(!valid);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSpecification<T> {
    components: usize,
    data_type: PhantomData<T>,
}

impl<T> SnapshotSpecification<T> {
    pub fn new(components: usize) -> Self {
        Self {
            components,
            data_type: PhantomData,
        }
    }

    pub fn components(&self) -> usize {
        self.components
    }
}

impl<T: Clone + Debug + Eq + Hash> Specification for SnapshotSpecification<T> {
    type State = Vec<Option<T>>;
    type Operation = SnapshotOperation<T>;

    fn init(&self) -> Self::State {
        vec![None; self.components]
    }

    fn apply(&self, operation: &Self::Operation, state: &Self::State) -> (bool, Self::State) {
        match operation {
            Scan(_, result) => match result {
                Some(view) => (view == state, state.clone()),
                None => panic!("Cannot apply Scan with an unknown return value."),
            },
            Update(k, value) => {
                let mut new_state = state.clone();
                new_state[*k] = Some(value.clone());
                (true, new_state)
            }
        }
    }
}
