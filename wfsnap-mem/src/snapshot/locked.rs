//! A snapshot object protected by a single [`Mutex`].
use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::snapshot::{check_index, ProcessId, Snapshot, View};
use crate::sync::Mutex;

/// A [`Mutex`]-based snapshot object.
///
/// Every operation takes the same lock, so scans are trivially consistent.
/// It is **not** lock-free, and serves as the sequential model that the
/// wait-free objects are compared against.
#[derive(Debug)]
pub struct LockedSnapshot<T> {
    mutex: Mutex<View<T>>,
    components: usize,
}

impl<T: Clone> LockedSnapshot<T> {
    pub fn new(components: usize) -> Result<Self> {
        SnapshotConfig::new(components, components).validate()?;
        Ok(Self {
            mutex: Mutex::new((0..components).map(|_| None).collect()),
            components,
        })
    }

    fn with_view<U>(&self, f: impl FnOnce(&mut View<T>) -> U) -> U {
        match self.mutex.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl<T: Clone> Snapshot for LockedSnapshot<T> {
    type Value = T;

    fn components(&self) -> usize {
        self.components
    }

    fn scan(&self, i: ProcessId) -> View<T> {
        check_index("process", i, self.components);
        self.with_view(|view| view.clone())
    }

    fn update(&self, i: ProcessId, value: T) {
        check_index("process", i, self.components);
        self.with_view(|view| view[i] = Some(value));
    }
}
