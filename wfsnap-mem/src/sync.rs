#[cfg(feature = "shuttle")]
pub(crate) use shuttle::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};
#[cfg(feature = "shuttle")]
pub(crate) use shuttle::thread;
#[cfg(not(feature = "shuttle"))]
pub(crate) use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};
#[cfg(not(feature = "shuttle"))]
pub(crate) use std::thread;

/// Gives the model checker a chance to switch threads before an access it
/// cannot see, such as a load or store on an `ArcSwap`.
#[cfg(feature = "shuttle")]
pub(crate) fn preemption_point() {
    shuttle::thread::yield_now();
}

#[cfg(not(feature = "shuttle"))]
#[inline(always)]
pub(crate) fn preemption_point() {}
