use std::sync::Arc;

use crate::sync::Mutex;

use super::Register;

/// A shared-memory register, backed by a [`Mutex`].
///
/// This object uses a mutex to protect against concurrent memory
/// access. It is **not** lock-free, but it is linearizable, which makes
/// it the register of choice when checking snapshot implementations
/// under the `shuttle` model checker.
///
/// # Examples
///
/// It is possible to store large, structured values. Each write replaces
/// the whole value.
///
/// ```
/// use std::sync::Arc;
/// use wfsnap_mem::register::{MutexRegister, Register};
///
/// #[derive(Debug, Default, PartialEq)]
/// enum Reading {
///     #[default]
///     Nothing,
///     Samples(Vec<u64>),
/// }
///
/// let register: MutexRegister<Reading> = MutexRegister::new(Arc::default());
/// assert_eq!(*register.read(), Reading::Nothing);
///
/// register.write(Arc::new(Reading::Samples(vec![42; 100])));
/// assert_eq!(*register.read(), Reading::Samples(vec![42; 100]));
/// ```
#[derive(Debug)]
pub struct MutexRegister<T> {
    mutex: Mutex<Arc<T>>,
}

impl<T: Default> Default for MutexRegister<T> {
    fn default() -> Self {
        MutexRegister::new(Arc::default())
    }
}

impl<T> Register for MutexRegister<T> {
    type Value = Arc<T>;

    fn new(value: Arc<T>) -> Self {
        Self {
            mutex: Mutex::new(value),
        }
    }

    fn read(&self) -> Arc<T> {
        // A panicking holder cannot leave a half-written Arc behind.
        match self.mutex.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write(&self, value: Arc<T>) {
        match self.mutex.lock() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl<T> Clone for MutexRegister<T> {
    fn clone(&self) -> Self {
        Self::new(self.read())
    }
}
