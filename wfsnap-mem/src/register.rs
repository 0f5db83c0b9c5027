//! Shared read/write registers holding whole, immutable values.
//!
//! Snapshot objects store each component in a register and replace its
//! contents in a single step, so a reader never observes a partial write.
//! See [`SwapRegister`] and [`MutexRegister`].
mod mutex;
pub use self::mutex::MutexRegister;
mod swap;
pub use self::swap::SwapRegister;

/// A shared-memory register.
pub trait Register {
    type Value;

    /// Creates a new register containing `value`.
    fn new(value: Self::Value) -> Self;

    /// Returns the value currently contained in the register.
    fn read(&self) -> Self::Value;

    /// Sets contents of the register to the specified value.
    fn write(&self, value: Self::Value);
}

