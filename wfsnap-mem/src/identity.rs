//! Assigning process identities to threads.
//!
//! Multi-writer snapshots index their handshake bits and published contents
//! by process, but callers only name the component they update. The
//! [`IdentityRegistry`] hands each thread a distinct [`ProcessId`] the first
//! time it touches the object, and the same identity on every later call.
use dashmap::DashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::snapshot::ProcessId;
use crate::sync::{thread, AtomicUsize, Ordering};

/// Identifies the thread asking for an identity.
pub type Token = thread::ThreadId;

/// A registry handing out identities in `[0, capacity)`.
///
/// Identities are taken from an atomic counter and are never reclaimed. Once
/// `capacity` threads have been assigned one, any new thread is refused with
/// [`Error::IdentitiesExhausted`].
///
/// # Examples
///
/// ```
/// use std::thread;
/// use wfsnap_mem::identity::IdentityRegistry;
///
/// let registry = IdentityRegistry::new(2);
/// let mine = registry.current().unwrap();
/// assert_eq!(registry.current().unwrap(), mine);
///
/// thread::scope(|s| {
///     s.spawn(|| assert_ne!(registry.current().unwrap(), mine));
/// });
///
/// thread::scope(|s| {
///     s.spawn(|| assert!(registry.current().is_err()));
/// });
/// ```
#[derive(Debug)]
pub struct IdentityRegistry {
    capacity: usize,
    next: AtomicUsize,
    assigned: DashMap<Token, ProcessId>,
}

impl IdentityRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: AtomicUsize::new(0),
            assigned: DashMap::new(),
        }
    }

    /// Returns the identity of the calling thread, assigning one if needed.
    pub fn current(&self) -> Result<ProcessId> {
        self.identity_for(thread::current().id())
    }

    /// Returns the identity belonging to `token`, assigning one if needed.
    pub fn identity_for(&self, token: Token) -> Result<ProcessId> {
        if let Some(id) = self.assigned.get(&token) {
            return Ok(*id);
        }
        let id = self
            .assigned
            .entry(token)
            .or_try_insert_with(|| self.allocate())?;
        Ok(*id)
    }

    /// Returns the number of identities handed out so far.
    pub fn assigned(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn allocate(&self) -> Result<ProcessId> {
        let capacity = self.capacity;
        match self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < capacity).then_some(n + 1)
            }) {
            Ok(id) => {
                debug!(id, capacity, "assigned process identity");
                Ok(id)
            }
            Err(_) => {
                debug!(capacity, "process identities exhausted");
                Err(Error::IdentitiesExhausted { capacity })
            }
        }
    }
}
