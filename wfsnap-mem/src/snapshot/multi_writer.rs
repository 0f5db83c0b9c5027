//! Multi-writer snapshot objects, as described in Section 6 of
//! Afek, Attiya, Dolev, Gafni, Merritt and Shavit
//! [[AAD+93]](https://dl.acm.org/doi/10.1145/153724.153741).
//!
//! Any of the object's processes may update any of its components. Each
//! register records which process wrote it last (its _mover_) and a toggle
//! bit that the mover flips on every write to that component, and the
//! handshake bits between pairs of processes live in a shared [`Handshakes`]
//! matrix.
//!
//! A scanner sees a process move either when it announces an update or when
//! it writes a register between two collects. Two moves may be the end of one
//! update and the start of the next, so a scanner must see a process move
//! three times before it may borrow the view that process published.
//!
//! # Examples
//!
//! Threads are assigned process identities the first time they use the
//! object.
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use wfsnap_mem::snapshot::MultiWriterSnapshot;
//! use wfsnap_mem::SnapshotConfig;
//!
//! let config = SnapshotConfig::new(2, 3);
//! let snapshot: Arc<MultiWriterSnapshot<&str>> = Arc::new(MultiWriterSnapshot::new(config).unwrap());
//!
//! let handles: Vec<_> = ["left", "right"]
//!     .into_iter()
//!     .map(|word| {
//!         let snapshot = snapshot.clone();
//!         // Both threads race to write component 0.
//!         thread::spawn(move || snapshot.update(0, word).unwrap())
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! let view = snapshot.scan().unwrap();
//! assert!(view[0] == Some("left") || view[0] == Some("right"));
//! assert_eq!(view[1], None);
//! assert_eq!(snapshot.identities().assigned(), 3);
//! ```
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::handshake::{HandshakeMatrix, Handshakes};
use crate::identity::IdentityRegistry;
use crate::register::{MutexRegister, Register, SwapRegister};
use crate::snapshot::{check_index, ProcessId, ScanReport, View, ViewSource};

/// How many earlier moves of a process a scanner tolerates before it borrows
/// that process's view.
///
/// Three moves seen in distinct rounds are three distinct announcements or
/// writes, all after the scan began, and so include one whole update.
pub const HELPING_BOUND: usize = 2;

/// A multi-writer snapshot backed by [`MutexRegister`] objects.
///
/// This snapshot is **not** lock-free. See [`MultiWriterSnapshot`].
pub type MultiWriterMutexSnapshot<T> =
    MultiWriterSnapshot<T, MutexRegister<MultiWriterContents<T>>>;

/// The contents of one component's register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiWriterContents<T> {
    value: Option<T>,
    view: View<T>,
    mover: Option<ProcessId>,
    toggle: bool,
}

impl<T> MultiWriterContents<T> {
    fn initial(components: usize) -> Self {
        Self {
            value: None,
            view: (0..components).map(|_| None).collect(),
            mover: None,
            toggle: false,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The view obtained by the scan embedded in the update that wrote these
    /// contents.
    pub fn view(&self) -> &[Option<T>] {
        &self.view
    }

    /// The process that wrote these contents, or `None` for a component that
    /// was never updated.
    pub fn mover(&self) -> Option<ProcessId> {
        self.mover
    }

    /// The mover's toggle bit for this component at the time of writing.
    pub fn toggle(&self) -> bool {
        self.toggle
    }
}

/// A wait-free multi-writer snapshot object.
///
/// The object has a fixed number of components and admits a fixed number of
/// processes, both taken from a [`SnapshotConfig`]. Every scan finishes after
/// at most `2 * processes + 1` double collects.
///
/// Processes can be identified implicitly, through [`scan`](Self::scan) and
/// [`update`](Self::update), which assign each calling thread an identity, or
/// explicitly through [`scan_as`](Self::scan_as) and
/// [`update_as`](Self::update_as). A given object should be used in only one
/// of the two ways, and an explicit identity must never be used by two threads
/// at the same time.
pub struct MultiWriterSnapshot<T, R = SwapRegister<MultiWriterContents<T>>> {
    config: SnapshotConfig,
    registers: Box<[R]>,
    // published[j] holds the contents process j wrote most recently, whichever
    // component it wrote them to.
    published: Box<[R]>,
    // toggles[j][k] flips on every write of component k by process j, and is
    // only ever written by process j.
    toggles: HandshakeMatrix,
    handshakes: Handshakes,
    identities: IdentityRegistry,
    _value: PhantomData<T>,
}

impl<T, R> MultiWriterSnapshot<T, R>
where
    T: Clone,
    R: Register<Value = Arc<MultiWriterContents<T>>>,
{
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        config.validate()?;
        let SnapshotConfig {
            components,
            processes,
        } = config;
        let initial = Arc::new(MultiWriterContents::initial(components));
        Ok(Self {
            config,
            registers: (0..components).map(|_| R::new(initial.clone())).collect(),
            published: (0..processes).map(|_| R::new(initial.clone())).collect(),
            toggles: HandshakeMatrix::new(processes, components),
            handshakes: Handshakes::new(processes),
            identities: IdentityRegistry::new(processes),
            _value: PhantomData,
        })
    }

    pub fn config(&self) -> SnapshotConfig {
        self.config
    }

    /// The registry that assigns process identities to calling threads.
    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// Returns a view of every component, as the calling thread's process.
    ///
    /// Fails if the calling thread has no identity yet and every identity has
    /// already been assigned.
    pub fn scan(&self) -> Result<View<T>> {
        let i = self.identities.current()?;
        Ok(self.scan_as(i))
    }

    /// Sets the contents of `component` to `value`, as the calling thread's
    /// process.
    ///
    /// Fails if the calling thread has no identity yet and every identity has
    /// already been assigned.
    ///
    /// # Panics
    ///
    /// Panics if `component` is not a component of this object.
    pub fn update(&self, component: usize, value: T) -> Result<()> {
        let i = self.identities.current()?;
        self.update_as(i, component, value);
        Ok(())
    }

    /// Returns a view of every component, as process _i_.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a process of this object.
    pub fn scan_as(&self, i: ProcessId) -> View<T> {
        self.scan_with_report(i).view
    }

    fn collect(&self) -> Vec<Arc<MultiWriterContents<T>>> {
        self.registers.iter().map(|r| r.read()).collect()
    }

    /// Returns whether process _i_ has seen process _j_ move while performing
    /// a double collect.
    ///
    /// Process _j_ moved if it announced a new handshake bit since _i_ took
    /// its `baseline`, or if some component that _j_ wrote last changed
    /// between the two collects.
    fn has_moved(
        &self,
        first: &[Arc<MultiWriterContents<T>>],
        second: &[Arc<MultiWriterContents<T>>],
        baseline: &[bool],
        i: ProcessId,
        j: ProcessId,
    ) -> bool {
        if self.handshakes.read(i, j) != baseline[j] {
            return true;
        }
        first.iter().zip(second).any(|(a, b)| {
            b.mover == Some(j) && (a.mover != b.mover || a.toggle != b.toggle)
        })
    }

    /// Scans the object on behalf of process _i_, and reports how the scan
    /// terminated.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a process of this object.
    pub fn scan_with_report(&self, i: ProcessId) -> ScanReport<T> {
        let processes = self.config.processes;
        check_index("process", i, processes);
        let mut moved = vec![0; processes];
        let mut baseline = vec![false; processes];
        let mut rounds = 0;
        loop {
            rounds += 1;
            for (j, bit) in baseline.iter_mut().enumerate() {
                *bit = self.handshakes.touch(i, j);
            }
            let first = self.collect();
            let second = self.collect();
            let movers: Vec<ProcessId> = (0..processes)
                .filter(|&j| self.has_moved(&first, &second, &baseline, i, j))
                .collect();
            if movers.is_empty() {
                return ScanReport {
                    view: second.iter().map(|c| c.value.clone()).collect(),
                    rounds,
                    source: ViewSource::Collected,
                };
            }
            for j in movers {
                if moved[j] == HELPING_BOUND {
                    // Process j moved three times, so at least one of its updates
                    // both began and ended during this scan.
                    trace!(scanner = i, helper = j, rounds, "borrowed view");
                    return ScanReport {
                        view: self.published[j].read().view.clone(),
                        rounds,
                        source: ViewSource::Borrowed(j),
                    };
                }
                moved[j] += 1;
            }
        }
    }

    /// Sets the contents of `component` to `value`, as process _i_.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a process, or `component` not a component, of
    /// this object.
    pub fn update_as(&self, i: ProcessId, component: usize, value: T) {
        let contents = self.prepare(i, component, value);
        self.publish(i, component, contents);
    }

    /// Announces an update of `component` by process _i_, performs its
    /// embedded scan and returns the contents the update will write.
    fn prepare(
        &self,
        i: ProcessId,
        component: usize,
        value: T,
    ) -> Arc<MultiWriterContents<T>> {
        check_index("process", i, self.config.processes);
        check_index("component", component, self.config.components);
        self.handshakes.announce(i);
        let view = self.scan_as(i);
        let toggle = !self.toggles.read(i, component);
        self.toggles.write(i, component, toggle);
        Arc::new(MultiWriterContents {
            value: Some(value),
            view,
            mover: Some(i),
            toggle,
        })
    }

    fn publish(&self, i: ProcessId, component: usize, contents: Arc<MultiWriterContents<T>>) {
        self.published[i].write(contents.clone());
        self.registers[component].write(contents);
    }
}
