use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::Register;
use crate::sync::preemption_point;

/// A shared-memory register backed by an [`ArcSwap`].
///
/// Reading the register is wait-free and writing it is lock-free: a write
/// swaps in a freshly allocated value with a single atomic store, and readers
/// keep the value they loaded alive through their own [`Arc`].
///
/// `ArcSwap` is invisible to Shuttle, so with the `shuttle` feature every read
/// and write first yields to the scheduler.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use wfsnap_mem::register::{Register, SwapRegister};
///
/// let register: Arc<SwapRegister<Vec<u32>>> = Arc::new(SwapRegister::new(Arc::new(vec![])));
///
/// let writer = register.clone();
/// let handle = thread::spawn(move || writer.write(Arc::new(vec![1, 2, 3])));
///
/// // Readers only ever see one of the two whole vectors.
/// let seen = register.read();
/// assert!(seen.is_empty() || *seen == vec![1, 2, 3]);
///
/// handle.join().unwrap();
/// assert_eq!(*register.read(), vec![1, 2, 3]);
/// ```
pub struct SwapRegister<T> {
    slot: ArcSwap<T>,
}

impl<T> Register for SwapRegister<T> {
    type Value = Arc<T>;

    fn new(value: Arc<T>) -> Self {
        Self {
            slot: ArcSwap::new(value),
        }
    }

    fn read(&self) -> Arc<T> {
        preemption_point();
        self.slot.load_full()
    }

    fn write(&self, value: Arc<T>) {
        preemption_point();
        self.slot.store(value)
    }
}

impl<T: Default> Default for SwapRegister<T> {
    fn default() -> Self {
        Self::new(Arc::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for SwapRegister<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapRegister")
            .field("slot", &self.slot.load_full())
            .finish()
    }
}
